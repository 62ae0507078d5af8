use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::app::App;
use super::models::WizardStep;

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(f.area());

    let header = Paragraph::new("StreamVault Video Extractor")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, chunks[0]);

    match app.step {
        WizardStep::Family => render_family_step(f, chunks[1], app),
        WizardStep::Scope => render_scope_step(f, chunks[1], app),
        WizardStep::Url => render_url_step(f, chunks[1], app),
        WizardStep::Confirm => render_confirm_step(f, chunks[1], app),
    }

    render_instructions(f, chunks[2], app);

    if app.show_help {
        render_help_popup(f);
    }
}

fn step_block(step: WizardStep) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(step.title())
        .border_style(Style::default().fg(Color::Yellow))
}

fn option_list<'a>(labels: Vec<&'a str>, selected: usize) -> Vec<ListItem<'a>> {
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if i == selected {
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(format!(" {}. {}", i + 1, label), style)))
        })
        .collect()
}

fn render_family_step(f: &mut Frame, area: Rect, app: &App) {
    let labels = app.families().iter().map(|family| family.label()).collect();
    let list = List::new(option_list(labels, app.family_index)).block(step_block(WizardStep::Family));
    f.render_widget(list, area);
}

fn render_scope_step(f: &mut Frame, area: Rect, app: &App) {
    let labels = app.scopes().iter().map(|scope| scope.label()).collect();
    let list = List::new(option_list(labels, app.scope_index)).block(step_block(WizardStep::Scope));
    f.render_widget(list, area);
}

fn render_url_step(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(format!("{}_", app.url_input))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(step_block(WizardStep::Url));
    f.render_widget(input, chunks[0]);

    let example = Paragraph::new(app.scope().example_url())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Example"));
    f.render_widget(example, chunks[1]);

    if let Some(error) = &app.error_message {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        f.render_widget(error, chunks[2]);
    }
}

fn render_confirm_step(f: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(vec![Span::styled("Links: ", Style::default().fg(Color::Gray)), Span::raw(app.family().label())]),
        Line::from(vec![Span::styled("Mode:  ", Style::default().fg(Color::Gray)), Span::raw(app.scope().label())]),
        Line::from(vec![Span::styled("URL:   ", Style::default().fg(Color::Gray)), Span::raw(app.url_input.trim())]),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start extraction",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(step_block(WizardStep::Confirm));
    f.render_widget(paragraph, area);
}

fn render_instructions(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.step {
        WizardStep::Family | WizardStep::Scope => "↑/↓ or number to choose • Enter: next • Backspace: back • ?: help • q/Esc: quit",
        WizardStep::Url => "Type or paste the URL • Enter: next • Backspace on empty: back • F1: help • Esc: quit",
        WizardStep::Confirm => "Enter: start • Backspace: back • Esc: quit",
    };

    let instructions = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(instructions, area);
}

fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 50, f.area());

    let help_text = vec![
        Line::from(Span::styled("StreamVault Video Extractor - Help", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Google Drive mode collects one Drive link per episode."),
        Line::from("Non-Drive mode collects Mega, direct video files and embeds,"),
        Line::from("and skips shows whose pages only carry Drive links."),
        Line::from(""),
        Line::from("Results are written as <name>.json and <name>.txt"),
        Line::from("in the output directory."),
        Line::from(""),
        Line::from(Span::styled("Press Esc, ? or F1 to close", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
