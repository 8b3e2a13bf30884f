//! Action scripts.
//!
//! Each step is `name` or `name:argument`, e.g. `sort:val` or
//! `filter:name=ann`.

use std::str::FromStr;

use anyhow::Context;
use anyhow::anyhow;
use anyhow::bail;
use lumina::Action;
use lumina::Modifiers;
use lumina::RowId;
use lumina::overlay::OverlayEvent;
use lumina::overlay::OverlayKind;

/// One scripted step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Act(Action),
    /// Scroll the viewport to an offset in pixels.
    ScrollTo(f64),
    /// A message from the embedding application.
    Message(String),
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (s.trim(), None),
        };
        let required = || arg.ok_or_else(|| anyhow!("`{}` needs an argument", name));

        let action = match name {
            "search" => Action::Search(arg.unwrap_or_default().to_string()),
            "filter" => {
                let (column, term) = required()?
                    .split_once('=')
                    .ok_or_else(|| anyhow!("filter expects COLUMN=TEXT"))?;
                Action::ColumnFilter {
                    column: column.to_string(),
                    term: term.to_string(),
                }
            }
            "clear-filters" => Action::ClearFilters,
            "sort" => Action::ToggleSort(required()?.to_string()),
            "page" => Action::GoToPage(parse_number(required()?)?),
            "next" => Action::NextPage,
            "prev" => Action::PreviousPage,
            "rows" => Action::SetRowsPerPage(parse_number(required()?)?),
            "select" => Action::ActivateRow {
                id: RowId(parse_number(required()?)?),
                modifiers: Modifiers::NONE,
            },
            "shift-select" => Action::ActivateRow {
                id: RowId(parse_number(required()?)?),
                modifiers: Modifiers::SHIFT,
            },
            "clear-selection" => Action::ClearSelection,
            "hide" => Action::HideSelected,
            "unhide" => Action::UnhideAll,
            "toggle-column" => Action::ToggleColumn(required()?.to_string()),
            "reset-columns" => Action::ResetColumns,
            "reset-rules" => Action::ResetRules,
            "theme" => Action::SetTheme(required()?.to_string()),
            "fullscreen" => Action::ToggleFullscreen,
            "minimize" => Action::ToggleMinimized,
            "menu" => Action::Overlay(OverlayEvent::Toggle(parse_overlay(required()?)?)),
            "escape" => Action::Overlay(OverlayEvent::Escape),
            "scroll" => {
                let px: f64 = required()?
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid scroll offset {:?}", arg))?;
                return Ok(Step::ScrollTo(px));
            }
            "message" => return Ok(Step::Message(required()?.to_string())),
            other => bail!("unknown action `{}`", other),
        };
        Ok(Step::Act(action))
    }
}

fn parse_number<T>(s: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.trim()
        .parse()
        .with_context(|| format!("invalid number {:?}", s))
}

fn parse_overlay(s: &str) -> anyhow::Result<OverlayKind> {
    match s.split_once('=') {
        Some(("format", column)) => Ok(OverlayKind::ConditionalFormat {
            column: column.to_string(),
        }),
        None if s == "columns" => Ok(OverlayKind::ColumnMenu),
        None if s == "downloads" => Ok(OverlayKind::DownloadMenu),
        _ => bail!("unknown menu `{}`", s),
    }
}
