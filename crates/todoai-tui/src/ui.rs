use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use todoai_core::credentials::mask_key;
use crate::app::{App, InputMode};
use crate::input::TextInput;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, add input, prompt input, list, footer
    let [header_area, add_area, prompt_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_add_input(app, frame, add_area);
    render_prompt_input(app, frame, prompt_area);
    render_task_list(app, frame, list_area);
    render_footer(app, frame, footer_area);

    // Popups
    match app.input_mode {
        InputMode::Editing => render_edit_popup(app, frame, area),
        InputMode::Settings => render_settings_popup(app, frame, area),
        _ => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let counts = if app.tasks.is_empty() {
        String::new()
    } else {
        format!(" [{}/{} done]", app.tasks.completed_count(), app.tasks.len())
    };

    let title = Line::from(vec![
        Span::styled(" AI-Powered Todo List ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(counts, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn input_block(title: &str, focused: bool) -> Block<'_> {
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
}

/// Draw a text input, placing the terminal cursor when it has focus
fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    input: &TextInput,
    placeholder: &str,
    focused: bool,
) {
    let inner = block.inner(area);
    let text = if input.value().is_empty() && !focused {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input.value().to_string())
    };

    // Keep the cursor in view for long inputs
    let scroll = input.cursor().saturating_sub(inner.width.saturating_sub(1) as usize) as u16;
    frame.render_widget(Paragraph::new(Line::from(text)).block(block).scroll((0, scroll)), area);

    if focused && !inner.is_empty() {
        let cursor_x = (input.cursor() as u16).saturating_sub(scroll);
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

fn render_add_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.input_mode == InputMode::Adding;
    render_text_input(
        frame,
        area,
        input_block(" Add ", focused),
        &app.add_input,
        "Add a new todo... (a)",
        focused,
    );
}

fn render_prompt_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.input_mode == InputMode::Prompting;
    let title = if app.is_generating() {
        format!(" Generating {} ", SPINNER[app.animation_frame as usize % SPINNER.len()])
    } else {
        " Generate with AI ".to_string()
    };
    render_text_input(
        frame,
        area,
        input_block(&title, focused),
        &app.prompt_input,
        "Describe what the AI should plan... (p)",
        focused,
    );
}

fn render_task_list(app: &mut App, frame: &mut Frame, area: Rect) {
    app.list_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Todos ");

    if app.tasks.is_empty() {
        let empty = Paragraph::new("No todos yet. Press 'a' to add one or 'p' to ask the AI.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .map(|task| {
            let (checkbox, text_style) = if task.completed {
                (
                    "[x] ",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ] ", Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::styled(checkbox, Style::default().fg(Color::Green)),
                Span::styled(task.text.clone(), text_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        _ => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " LIST ",
        InputMode::Adding => " ADD ",
        InputMode::Prompting => " AI ",
        InputMode::Editing => " EDIT ",
        InputMode::Settings => " SETTINGS ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("j/k", "nav"),
            ("J/K", "move"),
            ("space", "done"),
            ("e", "edit"),
            ("d", "delete"),
            ("a", "add"),
            ("p", "AI"),
            ("s", "settings"),
            ("q", "quit"),
        ],
        InputMode::Adding => &[("enter", "add"), ("tab", "AI"), ("esc", "back")],
        InputMode::Prompting => &[("enter", "generate"), ("tab", "add"), ("esc", "back")],
        InputMode::Editing => &[("enter", "save"), ("esc", "cancel")],
        InputMode::Settings => &[("enter", "save"), ("ctrl-d", "clear"), ("esc", "cancel")],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style)];
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    if let Some(status) = &app.status {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_edit_popup(app: &App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 70, 3);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Edit todo ");
    render_text_input(frame, popup, block, &app.edit_input, "", true);
}

fn render_settings_popup(app: &App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 60, 8);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Settings ");

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    // Rows collapse to zero height on short terminals instead of overflowing
    let [instructions_area, source_area, _, input_area, _, note_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let instructions = Paragraph::new("Mistral API key. Leave empty and press Enter to use the default.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, instructions_area);

    let source = Paragraph::new(format!("Current: {}", app.key_source().as_str()))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(source, source_area);

    // Mask the key with asterisks, keeping the last 4 characters visible
    let input = Paragraph::new(mask_key(app.key_input.value()))
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, input_area);

    if !input_area.is_empty() {
        let cursor_x = app.key_input.cursor().min(input_area.width as usize - 1) as u16;
        frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
    }

    let note = Paragraph::new("The key is stored in your local config file.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(note, note_area);
}
