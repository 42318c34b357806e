use std::path::PathBuf;

use anyhow::{bail, Context as _};
use mailsweep_domain::{PreviewPage, SweepError};

use super::{describe_account, load_config, FilterArgs};
use crate::context::{cancel_on_ctrl_c, AppContext};

pub async fn execute(
    config: Option<PathBuf>,
    filter: &FilterArgs,
    page: usize,
    page_size: Option<usize>,
) -> anyhow::Result<()> {
    if page == 0 {
        bail!("pages are numbered from 1");
    }
    let query = filter.resolve()?;
    let context = AppContext::new(load_config(config)?)?;
    let page_size = page_size.unwrap_or(context.config.preview.page_size);
    let cancel = cancel_on_ctrl_c();

    let profile = context.service.profile().await.context("failed to read the mailbox profile")?;
    println!("{}", describe_account(&profile));

    let discovery = match context.service.discover(&query, &cancel).await {
        Ok(discovery) => discovery,
        Err(SweepError::Cancelled) => {
            println!("Cancelled.");
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to enumerate messages"),
    };

    if discovery.is_empty() {
        println!("No messages match `{}`", discovery.query());
        return Ok(());
    }

    let result = context.service.preview(&discovery, page - 1, page_size).await;
    context.service.close()?;
    print!("{}", render_page(&result.context("failed to load previews")?, page_size));
    Ok(())
}

/// One line per message followed by a paging footer.
pub fn render_page(page: &PreviewPage, page_size: usize) -> String {
    let mut out = String::new();
    for item in &page.items {
        out.push_str(&format!("{:<32}  {:<48}  {}\n", truncate(&item.from, 32), truncate(&item.subject, 48), item.date));
    }

    let pages = page.total_matches.div_ceil(page_size.max(1));
    out.push_str(&format!("page {} of {} ({} matches)", page.page + 1, pages, page.total_matches));
    if page.has_more {
        out.push_str(&format!(", next: --page {}", page.page + 2));
    }
    out.push('\n');
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut short: String = value.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use mailsweep_domain::{MessageId, MessagePreview};

    use super::*;

    fn preview(id: &str, subject: &str) -> MessagePreview {
        MessagePreview {
            id: MessageId::from(id),
            from: "Shop <news@shop.com>".into(),
            to: "me@example.com".into(),
            subject: subject.into(),
            date: "Mon, 2 Sep 2024".into(),
        }
    }

    #[test]
    fn renders_rows_and_footer() {
        let page = PreviewPage {
            items: vec![preview("a", "Sale"), preview("b", "More sale")],
            page: 0,
            total_matches: 5,
            has_more: true,
        };

        let out = render_page(&page, 2);
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Sale"));
        assert_eq!(lines[2], "page 1 of 3 (5 matches), next: --page 2");
    }

    #[test]
    fn last_page_has_no_next_hint() {
        let page = PreviewPage { items: vec![preview("e", "x")], page: 2, total_matches: 5, has_more: false };
        assert!(render_page(&page, 2).ends_with("page 3 of 3 (5 matches)\n"));
    }

    #[test]
    fn long_values_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
