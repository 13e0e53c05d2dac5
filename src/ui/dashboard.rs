// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'écran complet :
// - Header (titre)
// - Analyse courante (si présente)
// - Résumé du portefeuille (si non vide)
// - Favoris en cartes ou tableau (ou état vide)
// - Footer : notification, confirmation, saisie ou raccourcis
// - Fenêtre de détails par-dessus, quand elle est ouverte
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin, taille relue à chaque frame
// 2. Layout : découpage de l'espace en zones
// 3. Widgets : Block, Paragraph...
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::StockAnalysis;
use crate::notification::NotificationKind;
use crate::ui::format::{format_euros, format_optional_percent};
use crate::ui::modal::render_details_modal;
use crate::ui::portfolio::{recommendation_style, render_favorites, render_summary};

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le dashboard est toujours dessiné
/// - Details ajoute le popup par-dessus
pub fn render(frame: &mut Frame, app: &App) {
    render_dashboard(frame, app);

    match app.current_screen {
        Screen::Details => render_details_modal(frame, &app.modal),
        Screen::Dashboard | Screen::InputMode => {}
    }
}

/// Dessine le dashboard
fn render_dashboard(frame: &mut Frame, app: &App) {
    let summary = app.portfolio.summary();
    let current = app.portfolio.current_analysis();

    // Les panneaux optionnels n'occupent de place que s'ils existent
    let mut constraints = vec![Constraint::Length(3)];
    if current.is_some() {
        constraints.push(Constraint::Length(3));
    }
    if summary.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.size());

    let mut index = 0;
    render_header(frame, chunks[index]);
    index += 1;

    if let Some(analysis) = current {
        render_current_analysis(frame, analysis, chunks[index]);
        index += 1;
    }

    if let Some(summary) = &summary {
        render_summary(frame, summary, chunks[index]);
        index += 1;
    }

    render_favorites(frame, &app.portfolio, chunks[index]);
    render_footer(frame, app, chunks[index + 1]);
}

/// Dessine le header avec le titre
fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyFolio ")
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "Suivi de portefeuille",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Dernière analyse effectuée (ajout d'un titre)
fn render_current_analysis(frame: &mut Frame, analysis: &StockAnalysis, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Dernière analyse ");

    let mut spans = vec![
        Span::styled(
            format!("{} ", analysis.symbol),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}  ", analysis.company_name),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(format!("{}  ", format_euros(analysis.current_price))),
        Span::raw(format!("{}  ", format_optional_percent(analysis.change_percent))),
        Span::styled(
            analysis.recommendation.label(),
            recommendation_style(analysis.recommendation),
        ),
    ];

    if let Some(at) = analysis.analyzed_at {
        spans.push(Span::styled(
            format!("  ({})", at.format("%d/%m/%Y %H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer
// ============================================================================

fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn warning_line(key: &'static str, message: String) -> Line<'static> {
    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("⚠  Appuyez sur ", warning),
        Span::styled(
            key,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        ),
        Span::styled(message, warning),
    ])
}

/// Contenu du footer, par ordre de priorité
fn footer_line(app: &App) -> Line<'static> {
    if app.is_awaiting_delete_confirmation() {
        let symbol = app
            .portfolio
            .selected()
            .map(|e| e.symbol.clone())
            .unwrap_or_else(|| "?".to_string());
        return warning_line(
            "[d]",
            format!(" à nouveau pour supprimer {} ou autre touche pour annuler ⚠", symbol),
        );
    }

    if app.is_awaiting_quit_confirmation() {
        return warning_line(
            "[q]",
            " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠".to_string(),
        );
    }

    if let Some(notification) = app.notifications.latest() {
        let (icon, color) = match notification.kind {
            NotificationKind::Success => ("✓ ", Color::Green),
            NotificationKind::Error => ("✗ ", Color::Red),
        };
        return Line::from(Span::styled(
            format!("{}{}", icon, notification.message),
            key_style(color),
        ));
    }

    if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement en cours...".to_string());
        return Line::from(Span::styled(format!("⏳ {}", message), key_style(Color::Cyan)));
    }

    Line::from(vec![
        Span::styled("[q]", key_style(Color::Yellow)),
        Span::raw(" Quitter  "),
        Span::styled("[↑↓ / j k]", key_style(Color::Yellow)),
        Span::raw(" Naviguer  "),
        Span::styled("[Enter]", key_style(Color::Yellow)),
        Span::raw(" Détails  "),
        Span::styled("[v]", key_style(Color::Yellow)),
        Span::raw(" Vue  "),
        Span::styled("[a]", key_style(Color::Green)),
        Span::raw(" Ajouter  "),
        Span::styled("[d]", key_style(Color::Red)),
        Span::raw(" Supprimer"),
    ])
}

/// Dessine le footer (ou la ligne de saisie en mode input)
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if app.is_in_input_mode() {
        render_input_footer(frame, app, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(footer_line(app))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode input : prompt + buffer + curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" [Enter] Valider  [ESC] Annuler ");

    let input_line = Line::from(vec![
        Span::styled(app.input_prompt.as_str(), key_style(Color::Cyan)),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let paragraph = Paragraph::new(input_line)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
