//! Interactive session over long-lived controllers. Each line is one form
//! submission; the affected table and any pending error are printed after it.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use client_core::{Catalog, EntityKind, ListController};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::{self, NamedAction, ProductAction},
    render,
};

#[derive(Parser, Debug)]
#[command(name = "catalog>", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    /// Reload and print products, models and brands
    Overview,
    Brands {
        #[command(subcommand)]
        action: NamedAction,
    },
    Models {
        #[command(subcommand)]
        action: NamedAction,
    },
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Dismiss pending errors on every list
    Clear,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Loads all three lists and prints them in page order: products, models,
/// brands.
pub async fn overview(
    catalog: &Catalog,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<bool> {
    let statuses = catalog.load_all().await;
    print_list(&catalog.products, out, err_out).await?;
    writeln!(out)?;
    print_list(&catalog.models, out, err_out).await?;
    writeln!(out)?;
    print_list(&catalog.brands, out, err_out).await?;
    Ok(statuses.iter().all(|status| status.is_success()))
}

async fn print_list<K: EntityKind>(
    controller: &ListController<K>,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<()> {
    let snapshot = controller.snapshot().await;
    render::table::<K>(out, &snapshot.items)?;
    if let Some(err) = &snapshot.last_error {
        render::error_popup(err_out, err)?;
    }
    Ok(())
}

pub async fn run(catalog: &Catalog) -> io::Result<bool> {
    let mut out = io::stdout();
    let mut err_out = io::stderr();

    overview(catalog, &mut out, &mut err_out).await?;
    writeln!(out, "\ntype `help` for commands, `quit` to leave")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(out, "catalog> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if handle_line(catalog, &line, &mut out, &mut err_out).await? == Flow::Quit {
            break;
        }
    }
    Ok(true)
}

async fn handle_line(
    catalog: &Catalog,
    line: &str,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<Flow> {
    let command = match parse_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(Flow::Continue),
        Err(message) => {
            write!(out, "{message}")?;
            return Ok(Flow::Continue);
        }
    };

    match command {
        ShellCommand::Overview => {
            overview(catalog, out, err_out).await?;
        }
        ShellCommand::Brands { action } => {
            cli::execute(&catalog.brands, action.into_brand_action(), out, err_out).await?;
        }
        ShellCommand::Models { action } => {
            cli::execute(&catalog.models, action.into_model_action(), out, err_out).await?;
        }
        ShellCommand::Products { action } => {
            cli::execute(&catalog.products, action.into_action(), out, err_out).await?;
        }
        ShellCommand::Clear => catalog.clear_errors().await,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|err| err.to_string())
}

/// Splits on whitespace, keeping single- or double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote\n".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_core::{BrandKind, ModelKind, ProductKind};

    use super::*;
    use crate::test_support::StubRepository;

    #[test]
    fn keeps_quoted_names_together() {
        assert_eq!(
            split_words(r#"products create --name "Oslo Corner" --price 899"#).expect("split"),
            vec!["products", "create", "--name", "Oslo Corner", "--price", "899"]
        );
        assert_eq!(
            split_words("brands update 3 --name ''").expect("split"),
            vec!["brands", "update", "3", "--name", ""]
        );
    }

    #[test]
    fn reports_unterminated_quote() {
        assert!(split_words(r#"brands create --name "IKEA"#).is_err());
    }

    #[test]
    fn parses_shell_commands() {
        assert_eq!(parse_line("   ").expect("blank"), None);
        assert_eq!(
            parse_line("brands delete 99").expect("parse"),
            Some(ShellCommand::Brands {
                action: NamedAction::Delete { id: 99 }
            })
        );
        assert_eq!(
            parse_line("models find -3").expect("parse"),
            Some(ShellCommand::Models {
                action: NamedAction::Find { id: -3 }
            })
        );
        assert_eq!(parse_line("exit").expect("parse"), Some(ShellCommand::Quit));
        assert_eq!(parse_line("clear").expect("parse"), Some(ShellCommand::Clear));
        assert!(parse_line("sofas list").is_err());
    }

    #[tokio::test]
    async fn bare_clear_dismisses_every_pending_error() {
        let catalog = Catalog::from_repositories(
            Arc::new(StubRepository::<BrandKind>::with_records(Vec::new())),
            Arc::new(StubRepository::<ModelKind>::with_records(Vec::new())),
            Arc::new(StubRepository::<ProductKind>::with_records(Vec::new())),
        );
        let mut out = Vec::new();
        let mut err_out = Vec::new();

        for line in ["brands delete -1", "models update 0 --name Corner", "products find 0"] {
            let flow = handle_line(&catalog, line, &mut out, &mut err_out)
                .await
                .expect("write");
            assert_eq!(flow, Flow::Continue);
        }
        assert!(catalog.brands.last_error().await.is_some());
        assert!(catalog.models.last_error().await.is_some());
        assert!(catalog.products.last_error().await.is_some());

        let flow = handle_line(&catalog, "clear", &mut out, &mut err_out)
            .await
            .expect("write");

        assert_eq!(flow, Flow::Continue);
        assert!(catalog.brands.last_error().await.is_none());
        assert!(catalog.models.last_error().await.is_none());
        assert!(catalog.products.last_error().await.is_none());
    }
}
