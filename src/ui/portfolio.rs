// ============================================================================
// Rendu du portefeuille
// ============================================================================
// Deux vues sur les mêmes favoris :
// - Cards : une carte par analyse (grille)
// - Table : une ligne par position
// Plus le panneau de résumé, affiché seulement si le portefeuille n'est
// pas vide.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{FavoriteEntry, Recommendation, StockAnalysis};
use crate::portfolio::{performance_class, PerformanceClass, Portfolio, PortfolioSummary, ViewMode};
use crate::ui::format::{format_euros, format_optional_percent, format_quantity};

/// Hauteur d'une carte (bordures comprises)
const CARD_HEIGHT: u16 = 6;

/// Largeur minimale d'une carte
const CARD_MIN_WIDTH: u16 = 28;

/// Message affiché quand il n'y a aucun favori
pub const EMPTY_MESSAGE: &str = "Aucun favori pour le moment";

// ============================================================================
// Styles
// ============================================================================

/// Style associé à une recommandation
pub fn recommendation_style(recommendation: Recommendation) -> Style {
    let color = match recommendation {
        Recommendation::Buy => Color::Green,
        Recommendation::Sell => Color::Red,
        Recommendation::Hold => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style associé à une performance
pub fn performance_style(value: f64) -> Style {
    match performance_class(value) {
        PerformanceClass::Positive => Style::default().fg(Color::Green),
        PerformanceClass::Negative => Style::default().fg(Color::Red),
        PerformanceClass::Neutral => Style::default().fg(Color::Gray),
    }
}

fn optional_performance_style(value: Option<f64>) -> Style {
    value
        .map(performance_style)
        .unwrap_or_else(|| Style::default().fg(Color::Gray))
}

// ============================================================================
// Résumé
// ============================================================================

/// Panneau de résumé : investissement total, nombre de positions, performance
pub fn render_summary(frame: &mut Frame, summary: &PortfolioSummary, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Résumé du portefeuille ");

    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled("Investissement total : ", label),
        Span::styled(format_euros(summary.total_investment), value),
        Span::raw("    "),
        Span::styled("Positions : ", label),
        Span::styled(summary.position_count.to_string(), value),
        Span::raw("    "),
        Span::styled("Performance moyenne : ", label),
        Span::styled(
            format_optional_percent(summary.average_performance),
            optional_performance_style(summary.average_performance).add_modifier(Modifier::BOLD),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Liste (cartes ou tableau)
// ============================================================================

/// Dessine les favoris dans la vue courante, ou l'état vide
pub fn render_favorites(frame: &mut Frame, portfolio: &Portfolio, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Mes favoris ({}) ", portfolio.view().label()));

    if portfolio.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(EMPTY_MESSAGE, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(Span::styled(
                "[a] Ajouter un titre",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match portfolio.view() {
        ViewMode::Cards => render_cards(frame, portfolio, inner),
        ViewMode::Table => render_table(frame, portfolio, inner),
    }
}

/// Grille de cartes ; on fait défiler par rangée pour garder la sélection
/// visible
fn render_cards(frame: &mut Frame, portfolio: &Portfolio, area: Rect) {
    let per_row = (area.width / CARD_MIN_WIDTH).max(1) as usize;
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;

    let selected_row = portfolio.selected_index() / per_row;
    let first_row = (selected_row + 1).saturating_sub(visible_rows);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    let favorites = portfolio.favorites();
    for (row_offset, row_area) in rows.iter().enumerate() {
        let start = (first_row + row_offset) * per_row;
        if start >= favorites.len() {
            break;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
            .split(*row_area);

        for (column, entry) in favorites[start..].iter().take(per_row).enumerate() {
            let index = start + column;
            render_card(frame, entry, index == portfolio.selected_index(), columns[column]);
        }
    }
}

/// Carte d'une analyse
pub fn render_card(frame: &mut Frame, entry: &FavoriteEntry, selected: bool, area: Rect) {
    let analysis = &entry.last_analysis;

    let border = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", entry.symbol));

    let paragraph = Paragraph::new(card_lines(analysis, entry.quantity)).block(block);
    frame.render_widget(paragraph, area);
}

fn card_lines(analysis: &StockAnalysis, quantity: f64) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            analysis.company_name.clone(),
            Style::default().fg(Color::White),
        )),
        Line::from(vec![
            Span::styled(
                format_euros(analysis.current_price),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format_optional_percent(analysis.change_percent),
                optional_performance_style(analysis.change_percent),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                analysis.recommendation.label(),
                recommendation_style(analysis.recommendation),
            ),
            Span::styled(
                format!("  x{}", format_quantity(quantity)),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ]
}

/// Tableau : une ligne par position
fn render_table(frame: &mut Frame, portfolio: &Portfolio, area: Rect) {
    let header = Row::new(vec![
        "Symbole", "Société", "Quantité", "Prix", "Valeur", "Perf.", "Reco.",
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = portfolio
        .favorites()
        .iter()
        .map(|entry| {
            let analysis = &entry.last_analysis;
            Row::new(vec![
                Cell::from(entry.symbol.clone()),
                Cell::from(analysis.company_name.clone()),
                Cell::from(format_quantity(entry.quantity)),
                Cell::from(format_euros(analysis.current_price)),
                Cell::from(format_euros(entry.position_value())),
                Cell::from(format_optional_percent(analysis.change_percent))
                    .style(optional_performance_style(analysis.change_percent)),
                Cell::from(analysis.recommendation.label())
                    .style(recommendation_style(analysis.recommendation)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));

    let mut state = TableState::default().with_selected(Some(portfolio.selected_index()));
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_styles_are_distinct() {
        let buy = recommendation_style(Recommendation::Buy);
        let sell = recommendation_style(Recommendation::Sell);
        let hold = recommendation_style(Recommendation::Hold);
        assert_ne!(buy, sell);
        assert_ne!(buy, hold);
        assert_ne!(sell, hold);
    }

    #[test]
    fn test_performance_style() {
        assert_eq!(performance_style(1.0).fg, Some(Color::Green));
        assert_eq!(performance_style(-1.0).fg, Some(Color::Red));
        assert_eq!(performance_style(0.0).fg, Some(Color::Gray));
    }

    #[test]
    fn test_card_lines() {
        let analysis = StockAnalysis {
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            current_price: 150.0,
            recommendation: Recommendation::Buy,
            change_percent: None,
            analyzed_at: None,
        };

        let lines = card_lines(&analysis, 10.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].spans[0].content, "150.00€");
        assert_eq!(lines[1].spans[2].content, "N/A");
        assert_eq!(lines[2].spans[0].content, "ACHETER");
    }
}
