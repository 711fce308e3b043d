use crate::cli::MarkupArgs;
use crate::output;
use vlist_engine::ListMarkup;

pub fn handle(args: MarkupArgs) -> anyhow::Result<()> {
    let markup = match args.prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => ListMarkup::with_prefix(prefix),
        _ => ListMarkup::new(),
    };
    output::output_success(serde_json::json!({
        "container_id": markup.container_id,
        "top_sentinel_id": markup.top_sentinel_id,
        "content_id": markup.content_id,
        "bottom_sentinel_id": markup.bottom_sentinel_id,
        "html": markup.to_html(),
    }))
}
