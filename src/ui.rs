use color_eyre::eyre::{eyre, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use health_diary::{DiaryEntry, Page};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
    Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub enum Action {
    Add,
    Search,
    NextPage,
    PrevPage,
    GotoPage,
    Edit,
    Tabs,
    Refresh,
    Latest,
    Probe,
    Quit,
}

pub enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

/// Everything the main screen shows.
pub struct Screen<'a> {
    pub heading: String,
    pub page: Page<'a, DiaryEntry>,
    pub status: &'a Status,
}

pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub multiline: bool,
}

impl FormField {
    pub fn line(label: &'static str, value: impl Into<String>) -> Self {
        FormField {
            label,
            value: value.into(),
            multiline: false,
        }
    }

    pub fn text(label: &'static str, value: impl Into<String>) -> Self {
        FormField {
            label,
            value: value.into(),
            multiline: true,
        }
    }
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventStream,
}

fn title_paragraph(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn instructions(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

/// First line of `text`, cut to `max_width` display columns with an ellipsis.
pub fn truncate(text: &str, max_width: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.width() <= max_width {
        return first_line.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in first_line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            events: EventStream::new(),
        })
    }

    pub fn display(&mut self, screen: &Screen) -> Result<()> {
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(2),
                ])
                .split(f.area());

            f.render_widget(title_paragraph(screen.heading.clone()), chunks[0]);

            let content_width = chunks[1].width.saturating_sub(60).max(10) as usize;
            let rows: Vec<Row> = screen
                .page
                .rows
                .iter()
                .map(|e| {
                    Row::new(vec![
                        Cell::from(e.id.map_or("-".to_string(), |id| id.to_string())),
                        Cell::from(e.entry_date.clone()),
                        Cell::from(truncate(&e.title, 20)),
                        Cell::from(truncate(&e.tag, 10)),
                        Cell::from(truncate(&e.weather, 10)),
                        Cell::from(truncate(&e.content, content_width)),
                    ])
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(5),
                    Constraint::Length(11),
                    Constraint::Length(20),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Min(10),
                ],
            )
            .header(
                Row::new(vec!["id", "date", "title", "tag", "weather", "content"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title("Entries"));
            f.render_widget(table, chunks[1]);

            let summary = Paragraph::new(format!(
                "Page {}/{}, {}",
                screen.page.number,
                screen.page.page_count(),
                screen.page.summary()
            ));
            f.render_widget(summary, chunks[2]);

            let status = match screen.status {
                Status::Info(text) => Span::styled(text.clone(), Style::default().fg(Color::Green)),
                Status::Warning(text) => {
                    Span::styled(text.clone(), Style::default().fg(Color::Yellow))
                }
                Status::Error(text) => Span::styled(
                    text.clone(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            };
            f.render_widget(Paragraph::new(Line::from(status)), chunks[3]);

            let key = |k: &'static str| {
                Span::styled(k, Style::default().add_modifier(Modifier::BOLD))
            };
            let controls = Line::from(vec![
                key("a"),
                Span::raw(" add  "),
                key("s"),
                Span::raw(" search  "),
                key("n/p"),
                Span::raw(" page  "),
                key("g"),
                Span::raw(" go to page  "),
                key("e"),
                Span::raw(" edit  "),
                key("t"),
                Span::raw(" tab  "),
                key("l"),
                Span::raw(" latest  "),
                key("r"),
                Span::raw(" refresh  "),
                key("x"),
                Span::raw(" probe  "),
                key("q"),
                Span::raw(" quit"),
            ]);
            let controls_paragraph = Paragraph::new(controls)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            f.render_widget(controls_paragraph, chunks[4]);
        })?;

        Ok(())
    }

    async fn next_key(&mut self) -> Result<KeyEvent> {
        loop {
            match self.events.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => return Ok(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(eyre!("terminal event stream closed")),
            }
        }
    }

    pub async fn handle_input(&mut self) -> Result<Option<Action>> {
        let key = self.next_key().await?;
        let action = match key.code {
            KeyCode::Char('a') => Some(Action::Add),
            KeyCode::Char('s') | KeyCode::Char('/') => Some(Action::Search),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => Some(Action::PrevPage),
            KeyCode::Char('g') => Some(Action::GotoPage),
            KeyCode::Char('e') => Some(Action::Edit),
            KeyCode::Char('t') => Some(Action::Tabs),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('l') => Some(Action::Latest),
            KeyCode::Char('x') => Some(Action::Probe),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
        Ok(action)
    }

    /// Multi-field text form. Returns the field values, or `None` on Esc.
    ///
    /// Tab/Down and Shift-Tab/Up move between fields. Enter moves to the
    /// next field (or inserts a newline in a multi-line field) and submits
    /// from the last one. Ctrl-S submits from anywhere.
    pub async fn prompt_form(
        &mut self,
        title: &str,
        mut fields: Vec<FormField>,
    ) -> Result<Option<Vec<String>>> {
        let mut active = 0;

        loop {
            self.terminal.draw(|f| {
                let mut constraints = vec![Constraint::Length(3)];
                constraints.extend(fields.iter().map(|field| {
                    if field.multiline {
                        Constraint::Min(5)
                    } else {
                        Constraint::Length(3)
                    }
                }));
                constraints.push(Constraint::Length(3));

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints(constraints)
                    .split(f.area());

                f.render_widget(title_paragraph(title.to_string()), chunks[0]);

                for (i, field) in fields.iter().enumerate() {
                    let (text, style) = if i == active {
                        (
                            format!("{}|", field.value),
                            Style::default().fg(Color::Cyan),
                        )
                    } else {
                        (field.value.clone(), Style::default())
                    };
                    let input = Paragraph::new(text).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(style)
                            .title(field.label),
                    );
                    f.render_widget(input, chunks[i + 1]);
                }

                f.render_widget(
                    instructions("Tab/Up/Down: Move, Enter: Next/Submit, Ctrl-S: Submit, Esc: Cancel"),
                    chunks[fields.len() + 1],
                );
            })?;

            let key = self.next_key().await?;
            let last = fields.len().saturating_sub(1);
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Tab | KeyCode::Down => active = (active + 1).min(last),
                KeyCode::BackTab | KeyCode::Up => active = active.saturating_sub(1),
                KeyCode::Enter if fields[active].multiline => fields[active].value.push('\n'),
                KeyCode::Enter if active == last => break,
                KeyCode::Enter => active += 1,
                KeyCode::Backspace => {
                    fields[active].value.pop();
                }
                KeyCode::Char(c) => fields[active].value.push(c),
                _ => {}
            }
        }

        Ok(Some(fields.into_iter().map(|f| f.value).collect()))
    }

    /// Single-line prompt.
    pub async fn prompt_line(
        &mut self,
        title: &str,
        label: &'static str,
        value: &str,
    ) -> Result<Option<String>> {
        let values = self
            .prompt_form(title, vec![FormField::line(label, value)])
            .await?;
        Ok(values.and_then(|mut v| v.pop()))
    }

    pub async fn select_tab(&mut self, tabs: &[String], current: &str) -> Result<Option<String>> {
        if tabs.is_empty() {
            return Ok(None);
        }
        let mut selected_index = tabs.iter().position(|t| t == current).unwrap_or(0);

        loop {
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(5),
                        Constraint::Length(3),
                    ])
                    .split(f.area());

                f.render_widget(title_paragraph("Select Tab".to_string()), chunks[0]);

                let items: Vec<ListItem> = tabs
                    .iter()
                    .map(|t| {
                        let marker = if t == current { " (current)" } else { "" };
                        ListItem::new(Line::from(format!("{}{}", t, marker)))
                    })
                    .collect();

                let tab_list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title("Tabs"))
                    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                    .highlight_symbol("> ");

                f.render_stateful_widget(
                    tab_list,
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );

                f.render_widget(
                    instructions("Up/Down: Navigate, Enter: Select, Esc: Cancel"),
                    chunks[2],
                );
            })?;

            match self.next_key().await?.code {
                KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                KeyCode::Down => {
                    if selected_index < tabs.len() - 1 {
                        selected_index += 1;
                    }
                }
                KeyCode::Enter => return Ok(Some(tabs[selected_index].clone())),
                KeyCode::Esc => return Ok(None),
                _ => {}
            }
        }
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn test_truncate_keeps_short_first_line() {
        assert_eq!(truncate("Run\nsecond line", 10), "Run");
    }

    #[test]
    fn test_truncate_counts_display_width() {
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        // Each of these characters is two columns wide.
        assert_eq!(truncate("日記を書いた", 5), "日記…");
    }
}
