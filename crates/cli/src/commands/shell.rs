//! Interactive shell.
//!
//! Each line is parsed as a [`Command`] and run against one long-lived
//! [`AppState`]. The latest notice stays in the prompt until it expires.

use std::time::Instant;

use bodega_storefront::api::StorefrontApi;
use bodega_storefront::notice::Notice;
use bodega_storefront::state::AppState;
use bodega_storefront::store::KeyValueStore;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Command, dispatch};
use crate::render;

#[derive(Parser)]
#[command(name = "bodega", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Read and run commands from stdin until `exit` or end of input.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub async fn run<A, S>(state: &mut AppState<A, S>) -> std::io::Result<()>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    render::emit("Type `help` for commands, `exit` to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut latest: Option<(Notice, Instant)> = None;

    loop {
        render::prompt(&prompt_text(state, latest.as_ref(), Instant::now()))?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let words = split_words(&line);
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            Some(_) => {}
        }

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                render::emit(&e.render().to_string());
                continue;
            }
        };

        let notice = match dispatch(state, command).await {
            Ok(output) => {
                if let Some(body) = &output.body {
                    render::emit(body);
                }
                output.notice
            }
            Err(e) => Some(e.into_notice()),
        };
        if let Some(notice) = notice {
            latest = Some((notice, Instant::now()));
        }
    }

    Ok(())
}

/// Prompt line: the live notice, if any, above `bodega [user] (items)>`.
fn prompt_text<A, S>(state: &AppState<A, S>, latest: Option<&(Notice, Instant)>, now: Instant) -> String {
    let mut prompt = String::new();
    if let Some((notice, shown_at)) = latest {
        if !Notice::is_expired(*shown_at, now) {
            prompt.push_str(&notice.to_string());
            prompt.push('\n');
        }
    }

    prompt.push_str("bodega");
    if let Some(user) = state.session().user() {
        prompt.push_str(" [");
        prompt.push_str(&user.name);
        prompt.push(']');
    }
    let items = state.cart().total_items();
    if items > 0 {
        prompt.push_str(&format!(" ({items})"));
    }
    if state.is_submitting() {
        prompt.push_str(" submitting");
    }
    prompt.push_str("> ");
    prompt
}

/// Split a line on whitespace, keeping single- or double-quoted runs together.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use bodega_core::{Email, Price, ProductId, UserId};
    use bodega_storefront::config::CheckoutDefaults;
    use bodega_storefront::models::{Product, User};
    use bodega_storefront::store::MemoryStore;
    use bodega_storefront::testing::FakeApi;

    use super::*;
    use crate::commands::CartAction;

    fn state() -> AppState<FakeApi, MemoryStore> {
        let api = FakeApi::new()
            .with_products(vec![Product {
                id: ProductId::new(1),
                name: "Rice".to_string(),
                description: String::new(),
                price: Price::from_cents(1000),
                stock: 5,
                category: "Granos".to_string(),
                image_url: String::new(),
            }])
            .with_account(
                User {
                    id: UserId::new(1),
                    name: "Ana".to_string(),
                    email: Email::parse("ana@bodega.test").unwrap(),
                },
                "secreto1",
                "jwt-ana",
            );
        AppState::new(api, MemoryStore::new(), CheckoutDefaults::default())
    }

    fn parse(line: &str) -> Command {
        ShellLine::try_parse_from(split_words(line)).unwrap().command
    }

    #[test]
    fn test_split_words_honors_quotes() {
        assert_eq!(
            split_words(r#"register -n "Ana María" -e ana@bodega.test  -p 'se creto'"#),
            vec![
                "register",
                "-n",
                "Ana María",
                "-e",
                "ana@bodega.test",
                "-p",
                "se creto"
            ]
        );
        assert!(split_words("   ").is_empty());
        assert_eq!(split_words(r#"search """#), vec!["search", ""]);
    }

    #[test]
    fn test_shell_lines_parse_as_commands() {
        assert!(matches!(
            parse("cart add 3"),
            Command::Cart {
                action: Some(CartAction::Add { product_id })
            } if product_id == ProductId::new(3)
        ));
        assert!(matches!(parse("cart"), Command::Cart { action: None }));
        assert!(matches!(parse("search arroz integral"), Command::Search { term } if term.len() == 2));
        assert!(ShellLine::try_parse_from(split_words("cart add abc")).is_err());
    }

    #[tokio::test]
    async fn test_prompt_shows_user_cart_and_live_notice() {
        let mut state = state();
        state.start().await;
        state.login("ana@bodega.test", "secreto1").await.unwrap();
        let notice = state.add_to_cart(ProductId::new(1)).unwrap();

        let shown = Instant::now();
        let latest = (notice, shown);

        let live = prompt_text(&state, Some(&latest), shown + Duration::from_secs(1));
        assert_eq!(live, "[ok] Rice added to your cart\nbodega [Ana] (1)> ");

        let expired = prompt_text(&state, Some(&latest), shown + Notice::DISPLAY_DURATION);
        assert_eq!(expired, "bodega [Ana] (1)> ");
    }

    #[tokio::test]
    async fn test_dispatch_cart_add_reports_notice() {
        let mut state = state();
        state.start().await;

        let output = dispatch(&mut state, parse("cart add 1")).await.unwrap();

        assert!(output.body.unwrap().contains("Items: 1  Total: $10.00"));
        assert_eq!(
            output.notice.unwrap().message,
            "Rice added to your cart"
        );
    }

    #[tokio::test]
    async fn test_dispatch_checkout_requires_login() {
        let mut state = state();
        state.start().await;
        dispatch(&mut state, parse("cart add 1")).await.unwrap();

        let err = dispatch(&mut state, parse("checkout")).await.unwrap_err();

        assert_eq!(err.notice().message, "Please log in to continue");
        assert_eq!(state.cart().total_items(), 1);
    }
}
