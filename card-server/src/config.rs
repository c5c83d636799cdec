//! Server configuration.
//!
//! Command-line flags with environment fallbacks, converted into a
//! [`ServerConfig`] that the handlers read from shared state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use card_core::{CardResult, HoursPolicy, IframePolicy, PageOptions, TemplateStore};
use clap::Parser;

/// Default port for the card server.
pub const DEFAULT_PORT: u16 = 9474;

/// Command-line arguments for card-server.
#[derive(Debug, Clone, Parser)]
#[command(name = "card-server")]
#[command(about = "Digital business card rendering server")]
#[command(version)]
pub struct ServerArgs {
    /// Port to listen on
    #[arg(long, env = "CARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind (localhost by default)
    #[arg(long, env = "CARD_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Directory of extra template JSON files; overrides built-ins by key
    #[arg(long, env = "CARD_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Require the clock to fall inside today's hours for "Open Now"
    #[arg(long, env = "CARD_STRICT_HOURS")]
    pub strict_hours: bool,

    /// Re-check pasted iframe sources against the embed allow-list
    #[arg(long, env = "CARD_REVALIDATE_IFRAMES")]
    pub revalidate_iframes: bool,

    /// Public page URL used for QR codes when a request carries none
    #[arg(long, env = "CARD_PUBLIC_URL")]
    pub public_url: Option<String>,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Extra template directory.
    pub templates_dir: Option<PathBuf>,
    /// Hours policy applied to every render.
    pub hours_policy: HoursPolicy,
    /// Iframe policy applied to every render.
    pub iframe_policy: IframePolicy,
    /// Fallback page URL for share widgets.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            templates_dir: None,
            hours_policy: HoursPolicy::default(),
            iframe_policy: IframePolicy::default(),
            public_url: None,
        }
    }
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            addr: SocketAddr::new(args.bind, args.port),
            templates_dir: args.templates_dir,
            hours_policy: if args.strict_hours {
                HoursPolicy::WithinHours
            } else {
                HoursPolicy::FlagOnly
            },
            iframe_policy: if args.revalidate_iframes {
                IframePolicy::Revalidate
            } else {
                IframePolicy::Trusted
            },
            public_url: args.public_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl ServerConfig {
    /// Build the template store: built-ins first, then the optional directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in or directory template fails to load.
    pub fn load_store(&self) -> CardResult<TemplateStore> {
        let mut store = TemplateStore::builtin()?;
        if let Some(dir) = &self.templates_dir {
            let loaded = store.load_dir(dir)?;
            tracing::info!(dir = %dir.display(), count = loaded.len(), "Loaded extra templates");
        }
        Ok(store)
    }

    /// Page options for one request.
    #[must_use]
    pub fn page_options(&self, language: Option<String>, page_url: Option<String>) -> PageOptions {
        PageOptions {
            language,
            page_url: page_url.or_else(|| self.public_url.clone()),
            hours_policy: self.hours_policy,
            iframe_policy: self.iframe_policy,
            ..PageOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["card-server"];
        argv.extend_from_slice(args);
        ServerArgs::try_parse_from(argv).expect("valid args").into()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.addr.port(), DEFAULT_PORT);
        assert!(config.addr.ip().is_loopback());
        assert_eq!(config.hours_policy, HoursPolicy::FlagOnly);
        assert_eq!(config.iframe_policy, IframePolicy::Trusted);
        assert!(config.public_url.is_none());
    }

    #[test]
    fn test_policy_flags() {
        let config = parse(&["--strict-hours", "--revalidate-iframes", "--port", "8088"]);
        assert_eq!(config.addr.port(), 8088);
        assert_eq!(config.hours_policy, HoursPolicy::WithinHours);
        assert_eq!(config.iframe_policy, IframePolicy::Revalidate);
    }

    #[test]
    fn test_page_options_fall_back_to_public_url() {
        let config = ServerConfig {
            public_url: Some("https://cards.example.com".to_string()),
            ..ServerConfig::default()
        };
        let options = config.page_options(None, None);
        assert_eq!(options.page_url.as_deref(), Some("https://cards.example.com"));

        let options = config.page_options(Some("fr".into()), Some("https://x.example".into()));
        assert_eq!(options.page_url.as_deref(), Some("https://x.example"));
        assert_eq!(options.language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_load_store_with_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("florist.json"),
            r#"{"name":"Florist","sections":[{"key":"header","name":"Header","required":true,"fields":[]}]}"#,
        )
        .expect("write template");
        let config = ServerConfig {
            templates_dir: Some(dir.path().to_path_buf()),
            ..ServerConfig::default()
        };
        let store = config.load_store().expect("store loads");
        assert!(store.get("florist").is_some());
        assert!(store.get("restaurant").is_some());
    }
}
