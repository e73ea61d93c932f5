//! Shared driver for paged list commands

use fc_core::{PageFetcher, PaginationMetadata, Paginator};
use serde::Serialize;

use super::{PaginationArgs, configured_page_size};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

/// Run a paged listing and print it
///
/// JSON mode prints the whole result envelope; human mode prints a table built
/// by `row` under `headers`, followed by a paging footer.
pub async fn run<F, R>(
    fetcher: &F,
    args: &PaginationArgs,
    formatter: &Formatter,
    headers: &[&str],
    row: R,
) -> ExitCode
where
    F: PageFetcher,
    F::Item: Serialize,
    R: Fn(&F::Item) -> Vec<String>,
{
    let config = match args.to_config(configured_page_size()) {
        Ok(config) => config,
        Err(e) => return formatter.fail(&e),
    };

    let operation = fetcher.operation();
    let spinner = if config.should_show_progress() {
        Spinner::start(formatter.config(), operation)
    } else {
        Spinner::hidden()
    };

    let result = Paginator::new(config)
        .collect_with_progress(fetcher, |pages, items| spinner.pages(operation, pages, items))
        .await;
    spinner.finish();

    let result = match result {
        Ok(result) => result,
        Err(e) => return formatter.fail(&e),
    };

    if formatter.is_json() {
        formatter.json(&result);
        return ExitCode::Success;
    }

    if result.data.is_empty() {
        formatter.println("No items found.");
    } else {
        formatter.table(headers, result.data.iter().map(row).collect());
    }
    formatter.println(&formatter.dim(&footer(&result.metadata)));
    ExitCode::Success
}

/// One-line paging summary for human output
pub fn footer(metadata: &PaginationMetadata) -> String {
    let mut line = format!(
        "{} item(s) from {} page(s)",
        metadata.items_fetched, metadata.total_pages_fetched
    );
    if metadata.has_more {
        match &metadata.next_page_token {
            Some(token) => line.push_str(&format!(
                "; more available (use --all, or --page-token {token} to continue)"
            )),
            None => line.push_str("; more available"),
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_last_page() {
        let metadata = PaginationMetadata {
            page: 2,
            items_fetched: 30,
            has_more: false,
            total_pages_fetched: 2,
            next_page_token: None,
        };
        assert_eq!(footer(&metadata), "30 item(s) from 2 page(s)");
    }

    #[test]
    fn test_footer_with_more() {
        let metadata = PaginationMetadata {
            page: 1,
            items_fetched: 100,
            has_more: true,
            total_pages_fetched: 1,
            next_page_token: Some("v1.next".into()),
        };
        insta::assert_snapshot!(
            footer(&metadata),
            @"100 item(s) from 1 page(s); more available (use --all, or --page-token v1.next to continue)"
        );
    }

    #[test]
    fn test_json_envelope() {
        let result = fc_core::PaginationResult {
            data: vec!["a.csv", "b.csv"],
            metadata: PaginationMetadata {
                page: 1,
                items_fetched: 2,
                has_more: true,
                total_pages_fetched: 1,
                next_page_token: Some("v1.next".into()),
            },
        };
        insta::assert_json_snapshot!(result, @r#"
        {
          "data": [
            "a.csv",
            "b.csv"
          ],
          "pagination": {
            "page": 1,
            "items_count": 2,
            "has_more": true,
            "total_pages_fetched": 1,
            "next_page_token": "v1.next"
          }
        }
        "#);
    }
}
