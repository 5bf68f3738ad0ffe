//! Command definitions and dispatch.
//!
//! One-shot invocations and shell lines share the same [`Command`] enum and
//! go through [`dispatch`].

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod shell;

use bodega_core::ProductId;
use bodega_storefront::api::StorefrontApi;
use bodega_storefront::error::AppError;
use bodega_storefront::notice::Notice;
use bodega_storefront::state::AppState;
use bodega_storefront::store::KeyValueStore;
use clap::Subcommand;

use crate::render;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the catalog
    Catalog {
        /// Only show this category (`all` for every product)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List product categories
    Categories,
    /// Search products by name or category
    Search {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Autocomplete suggestions for a partial term
    Suggest {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "BODEGA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// At least 6 characters
        #[arg(short, long, env = "BODEGA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Place an order for the cart contents
    Checkout,
    /// Show your order history
    Orders,
    /// Interactive session
    Shell,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product from the cart
    Remove { product_id: ProductId },
    /// One more unit of a product already in the cart
    Inc { product_id: ProductId },
    /// One less unit; the line is removed at zero
    Dec { product_id: ProductId },
}

/// What a command produced for the terminal.
#[derive(Debug, Default)]
pub struct Output {
    pub body: Option<String>,
    pub notice: Option<Notice>,
}

impl Output {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            notice: None,
        }
    }

    pub const fn notice(notice: Notice) -> Self {
        Self {
            body: None,
            notice: Some(notice),
        }
    }

    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// Run a command against the state.
///
/// # Errors
///
/// Returns the `AppError` of the underlying storefront command.
pub async fn dispatch<A, S>(state: &mut AppState<A, S>, command: Command) -> Result<Output, AppError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    match command {
        Command::Catalog { category } => Ok(catalog::browse(state, category.as_deref())),
        Command::Categories => Ok(catalog::categories(state)),
        Command::Search { term } => Ok(catalog::search(state, &term.join(" "))),
        Command::Suggest { term } => Ok(catalog::suggest(state, &term.join(" "))),
        Command::Cart { action } => cart::run(state, action.unwrap_or(CartAction::Show)),
        Command::Login { email, password } => account::login(state, &email, &password).await,
        Command::Register {
            name,
            email,
            password,
        } => account::register(state, &name, &email, &password).await,
        Command::Logout => Ok(account::logout(state)),
        Command::Whoami => Ok(account::whoami(state)),
        Command::Checkout => orders::checkout(state).await,
        Command::Orders => orders::history(state).await,
        Command::Shell => Ok(Output::notice(Notice::info("Already in the shell"))),
    }
}

/// Dispatch and print the outcome. Returns whether the command succeeded.
pub async fn execute<A, S>(state: &mut AppState<A, S>, command: Command) -> bool
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    match dispatch(state, command).await {
        Ok(output) => {
            print(&output);
            true
        }
        Err(e) => {
            render::notice(&e.into_notice());
            false
        }
    }
}

pub fn print(output: &Output) {
    if let Some(body) = &output.body {
        render::emit(body);
    }
    if let Some(notice) = &output.notice {
        render::notice(notice);
    }
}
