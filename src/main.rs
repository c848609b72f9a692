mod ui;

use chrono::{Local, NaiveDate};
use color_eyre::eyre::Result;
use health_diary::sheets::{MemorySheet, SheetBackend, SheetsClient};
use health_diary::{paginate, BackendKind, Config, DiaryEntry, DiaryStore, EntryFields, NewEntry};
use std::fs::OpenOptions;
use std::sync::Arc;
use ui::{Action, FormField, Screen, Status, UI};

/// Rows shown by the "latest" view.
const LATEST_ROWS: usize = 100;

enum Mode {
    Search,
    Latest,
}

struct View {
    mode: Mode,
    query: String,
    page: usize,
    page_count: usize,
    status: Status,
}

fn init_logging(path: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn open_backend(config: &Config) -> Result<Arc<dyn SheetBackend>> {
    let backend: Arc<dyn SheetBackend> = match config.backend {
        BackendKind::Sheets => Arc::new(
            SheetsClient::new(config.spreadsheet_id.clone(), config.access_token.clone())?
                .with_base_url(&config.api_base),
        ),
        BackendKind::Memory => Arc::new(MemorySheet::diary(
            config.tab.as_deref().unwrap_or("Sheet1"),
        )),
    };
    Ok(backend)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::from_env()?;
    init_logging(&config.log_file)?;

    // Credential and connectivity failures end the program here, before the UI starts.
    let mut store = DiaryStore::connect(open_backend(&config)?, config.tab.as_deref())
        .await?
        .with_cache_ttl(config.cache_ttl)
        .with_write_strategy(config.write_strategy)
        .with_probe_cell(config.probe_cell);
    store.load().await?;

    let mut view = View {
        mode: Mode::Search,
        query: String::new(),
        page: 1,
        page_count: 1,
        status: Status::Info(format!("Connected to tab '{}'", store.tab())),
    };
    let mut ui = UI::new()?;

    loop {
        let rows = match view.mode {
            Mode::Search => store.search(&view.query).await,
            Mode::Latest => store.recent(LATEST_ROWS).await,
        };
        let rows: Vec<DiaryEntry> = rows.unwrap_or_else(|e| {
            view.status = Status::Error(e.to_string());
            Vec::new()
        });

        let page = paginate(&rows, view.page);
        view.page_count = page.page_count();
        let heading = match view.mode {
            Mode::Search if view.query.trim().is_empty() => {
                format!("Health Diary [{}]", store.tab())
            }
            Mode::Search => format!("Health Diary [{}] search: {}", store.tab(), view.query),
            Mode::Latest => format!("Health Diary [{}] latest {}", store.tab(), LATEST_ROWS),
        };
        ui.display(&Screen {
            heading,
            page,
            status: &view.status,
        })?;

        let Some(action) = ui.handle_input().await? else {
            continue;
        };
        match action {
            Action::Add => add_entry(&mut ui, &store, &mut view).await?,
            Action::Search => {
                if let Some(query) = ui
                    .prompt_line("Search Entries", "Keywords (comma = AND)", &view.query)
                    .await?
                {
                    view.query = query;
                    view.mode = Mode::Search;
                    view.page = 1;
                }
            }
            Action::NextPage => view.page = (view.page + 1).min(view.page_count),
            Action::PrevPage => view.page = view.page.saturating_sub(1).max(1),
            Action::GotoPage => {
                if let Some(input) = ui.prompt_line("Go To Page", "Page number", "").await? {
                    match input.trim().parse::<usize>() {
                        Ok(n) => view.page = n.max(1),
                        Err(_) => {
                            view.status =
                                Status::Warning(format!("'{}' is not a page number", input))
                        }
                    }
                }
            }
            Action::Edit => edit_entry(&mut ui, &store, &mut view).await?,
            Action::Tabs => match store.tabs().await {
                Ok(tabs) => {
                    if let Some(tab) = ui.select_tab(&tabs, store.tab()).await? {
                        view.status = match store.select_tab(&tab).await {
                            Ok(()) => {
                                view.page = 1;
                                Status::Info(format!("Switched to tab '{}'", tab))
                            }
                            Err(e) => Status::Error(e.to_string()),
                        };
                    }
                }
                Err(e) => view.status = Status::Error(e.to_string()),
            },
            Action::Refresh => {
                store.refresh().await;
                view.status = Status::Info("Reloaded from the spreadsheet".to_string());
            }
            Action::Latest => {
                view.mode = match view.mode {
                    Mode::Search => Mode::Latest,
                    Mode::Latest => Mode::Search,
                };
                view.page = 1;
            }
            Action::Probe => {
                view.status = match store.probe().await {
                    Ok(report) if report.matches() => Status::Info(format!(
                        "Probe {}: wrote and read '{}'",
                        report.cell, report.written
                    )),
                    Ok(report) => Status::Warning(format!(
                        "Probe {}: wrote '{}', read '{}'",
                        report.cell, report.written, report.read_back
                    )),
                    Err(e) => Status::Error(e.to_string()),
                };
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

async fn add_entry(ui: &mut UI, store: &DiaryStore, view: &mut View) -> Result<()> {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let Some(values) = ui
        .prompt_form(
            "New Diary Entry",
            vec![
                FormField::line("Date (YYYY-MM-DD)", today),
                FormField::line("Title", ""),
                FormField::text("Content", ""),
                FormField::line("Tag", ""),
                FormField::line("Weather", ""),
            ],
        )
        .await?
    else {
        return Ok(());
    };

    let [date, title, content, tag, weather]: [String; 5] = match values.try_into() {
        Ok(values) => values,
        Err(_) => return Ok(()),
    };
    let entry_date = match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            view.status = Status::Warning(format!("'{}' is not a YYYY-MM-DD date", date));
            return Ok(());
        }
    };

    let entry = NewEntry {
        entry_date,
        title,
        content,
        tag,
        weather,
    };
    view.status = match store.append(entry).await {
        Ok(id) => Status::Info(format!("Added entry {}", id)),
        Err(e) => Status::Error(e.to_string()),
    };
    Ok(())
}

/// Date lookup, then edit form, then save. `#N` addresses storage row N directly.
async fn edit_entry(ui: &mut UI, store: &DiaryStore, view: &mut View) -> Result<()> {
    let Some(key) = ui
        .prompt_line("Edit Entry", "Entry date (YYYY-MM-DD) or #row", "")
        .await?
    else {
        return Ok(());
    };

    let located = match key.trim().strip_prefix('#') {
        Some(row) => match row.trim().parse::<u32>() {
            Ok(row) => store.locator_for_row(row).await.map(Some),
            Err(_) => {
                view.status = Status::Warning(format!("'{}' is not a row number", row));
                return Ok(());
            }
        },
        None => store.locate(&key).await,
    };
    let locator = match located {
        Ok(Some(locator)) => locator,
        Ok(None) => {
            view.status = Status::Warning(format!("No entry dated '{}'", key.trim()));
            return Ok(());
        }
        Err(e) => {
            view.status = Status::Error(e.to_string());
            return Ok(());
        }
    };

    let current = match store.read_row(locator).await {
        Ok(fields) => fields,
        Err(e) => {
            view.status = Status::Error(e.to_string());
            return Ok(());
        }
    };

    let Some(values) = ui
        .prompt_form(
            &format!("Edit {}", locator),
            vec![
                FormField::line("Date", current.entry_date),
                FormField::line("Title", current.title),
                FormField::text("Content", current.content),
                FormField::line("Tag", current.tag),
                FormField::line("Weather", current.weather),
            ],
        )
        .await?
    else {
        return Ok(());
    };

    let [entry_date, title, content, tag, weather]: [String; 5] = match values.try_into() {
        Ok(values) => values,
        Err(_) => return Ok(()),
    };
    let fields = EntryFields {
        entry_date,
        title,
        content,
        tag,
        weather,
    };

    view.status = match store.update(locator, fields).await {
        Ok(()) => match store.read_row(locator).await {
            Ok(saved) => Status::Info(format!(
                "Updated {}: {} {}",
                locator, saved.entry_date, saved.title
            )),
            Err(_) => Status::Info(format!("Updated {}", locator)),
        },
        Err(e) => Status::Error(format!("Saving {} failed: {}", locator, e)),
    };
    Ok(())
}
