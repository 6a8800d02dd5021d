//! Context construction hooks.
//!
//! A deck decides what every response starts with and can touch the
//! context before the match tree runs. Decks are shared by concurrent
//! requests, so they must not hold per-request state.

use crate::config::schema::ResponseConfig;
use crate::http::response::Headers;
use crate::routing::context::Context;
use crate::routing::flow::Flow;

/// Customizes how a dispatcher prepares each request.
pub trait Deck: Send + Sync {
    /// Headers every response starts with.
    fn default_headers(&self) -> Headers {
        Headers::new()
    }

    /// Runs before the match tree; may halt.
    fn prepare(&self, _ctx: &mut Context<'_>) -> Flow {
        Ok(())
    }
}

/// No default headers, no preparation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicDeck;

impl Deck for BasicDeck {}

/// Default headers taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDeck {
    headers: Headers,
}

impl ConfiguredDeck {
    /// Deck that starts every response with `headers`.
    pub fn new(headers: Headers) -> Self {
        Self { headers }
    }

    pub fn from_config(config: &ResponseConfig) -> Self {
        Self::new(config.default_headers.clone())
    }
}

impl Deck for ConfiguredDeck {
    fn default_headers(&self) -> Headers {
        self.headers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::env::Env;
    use crate::routing::dispatcher::Dispatcher;

    struct TenantDeck;

    impl Deck for TenantDeck {
        fn default_headers(&self) -> Headers {
            [("X-Tenant".to_string(), "acme".to_string())].into_iter().collect()
        }

        fn prepare(&self, ctx: &mut Context<'_>) -> Flow {
            ctx.inbox.insert("tenant", "acme");
            Ok(())
        }
    }

    #[test]
    fn test_custom_deck_seeds_headers_and_inbox() {
        let app = Dispatcher::with_deck(TenantDeck, |c| {
            c.root(|c| {
                let tenant = c.param("tenant").unwrap_or_default().to_string();
                c.res.write(tenant);
                Ok(())
            })
        });

        let response = app.call(&mut Env::get("/")).unwrap();
        assert_eq!(response.header("X-Tenant"), Some("acme"));
        assert_eq!(response.body_bytes(), "acme");
    }

    #[test]
    fn test_default_headers_on_404() {
        let mut config = ResponseConfig::default();
        config
            .default_headers
            .insert("X-Content-Type-Options".into(), "nosniff".into());

        let app = Dispatcher::with_deck(ConfiguredDeck::from_config(&config), |_| Ok(()));
        let response = app.call(&mut Env::get("/missing")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.header("X-Content-Type-Options"), Some("nosniff"));
    }
}
