//! `waterline readings`: the paginated, newest-first log.

use waterline_core::{MonitorConfig, RangePreset};
use waterline_core::view::{PAGE_SIZE, paginate};

use crate::cli::{GlobalOpts, OutputFormat, ReadingsArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, ReadingRow};

pub async fn handle(
    config: MonitorConfig,
    args: &ReadingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let range = util::time_range(&args.range, RangePreset::All)?;
    if args.page == 0 {
        return Err(CliError::Validation {
            field: "page".into(),
            reason: "pages start at 1".into(),
        });
    }

    let readings = util::fetch_readings(config, global).await?;
    let visible = util::in_range(&readings, &range);
    let page = paginate(visible, args.page, PAGE_SIZE);

    if page.total_pages > 0 && page.page > page.total_pages {
        return Err(CliError::Validation {
            field: "page".into(),
            reason: format!("only {} page(s) in {}", page.total_pages, range.label()),
        });
    }

    let out = match global.output {
        // Structured formats carry the paging metadata with the rows.
        OutputFormat::Json => output::render_json(&page, false)?,
        OutputFormat::JsonCompact => output::render_json(&page, true)?,
        _ => {
            let body = output::render_list(
                &global.output,
                &page.items,
                |r| ReadingRow::from(*r),
                |r| util::plain_line(r),
            )?;
            if matches!(global.output, OutputFormat::Table) {
                format!(
                    "{body}\nPage {} of {} ({} readings, {})",
                    page.page,
                    page.total_pages.max(1),
                    page.total_items,
                    range.label()
                )
            } else {
                body
            }
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
