// ============================================================================
// Rendu de la fenêtre de détails
// ============================================================================
// Popup centré par-dessus le dashboard :
// - Onglets de plage (1J 1S 1M 1A 5A)
// - Graphique en chandeliers
// - 3 tuiles : dernier cours, volume, potentiel mensuel
// - Liste des actualités
//
// États : chargement, erreur (message + réessayer), données. Pendant un
// chargement le corps est remplacé par l'indicateur : jamais de données
// d'une autre plage sous l'onglet sélectionné.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
    Frame,
};

use crate::modal::DetailsModal;
use crate::models::{Stock, StockDetails, TimeRange};
use crate::ui::chart::render_chart;
use crate::ui::format::{format_euros, format_percent, format_volume};
use crate::ui::portfolio::performance_style;

/// Nombre d'actualités affichées au maximum
const MAX_NEWS: usize = 5;

/// Rectangle centré occupant un pourcentage de la zone
///
/// CONCEPT RATATUI : Layout imbriqués
/// - Découpe verticale puis horizontale avec des marges égales
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Dessine la fenêtre (rien si elle est fermée)
pub fn render_details_modal(frame: &mut Frame, modal: &DetailsModal) {
    let Some(stock) = modal.stock() else {
        return;
    };

    let area = centered_rect(90, 90, frame.size());

    // Efface le dashboard sous le popup
    frame.render_widget(Clear, area);

    let mut title = format!(" {} - {} ", stock.symbol, stock.name);
    if !stock.exchange.is_empty() {
        title = format!(" {} - {} ({}) ", stock.symbol, stock.name, stock.exchange);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Onglets
            Constraint::Min(0),    // Corps
            Constraint::Length(1), // Aide
        ])
        .split(inner);

    render_range_tabs(frame, modal.range(), chunks[0]);

    if modal.is_loading() {
        render_loading(frame, chunks[1]);
    } else {
        match (modal.details(), modal.last_error()) {
            // Erreur : affichée en priorité, même s'il reste d'anciennes données
            (_, Some(error)) => render_error(frame, error, chunks[1]),
            (Some(details), None) => render_body(frame, modal, stock, details, chunks[1]),
            (None, None) => render_loading(frame, chunks[1]),
        }
    }

    render_help(frame, chunks[2]);
}

fn render_range_tabs(frame: &mut Frame, selected: TimeRange, area: Rect) {
    let titles: Vec<Line> = TimeRange::ALL
        .iter()
        .map(|range| Line::from(format!(" {} ", range.label())))
        .collect();

    let index = TimeRange::ALL
        .iter()
        .position(|r| *r == selected)
        .unwrap_or_default();

    let tabs = Tabs::new(titles)
        .select(index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⏳ Chargement des données...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn render_error(frame: &mut Frame, error: &str, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⚠ Impossible de charger les données",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[r]",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Réessayer"),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn render_body(
    frame: &mut Frame,
    modal: &DetailsModal,
    stock: &Stock,
    details: &StockDetails,
    area: Rect,
) {
    let news_height = (modal.news().len().min(MAX_NEWS) as u16 * 2 + 2).max(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),              // Graphique
            Constraint::Length(4),           // Tuiles
            Constraint::Length(news_height), // Actualités
        ])
        .split(area);

    render_chart(frame, &details.historical_data, modal.range(), chunks[0]);
    render_tiles(frame, stock, details, chunks[1]);
    render_news(frame, modal, chunks[2]);
}

/// Tuile : titre + valeur
fn tile<'a>(title: &'a str, value: String, style: Style) -> Paragraph<'a> {
    Paragraph::new(Line::from(Span::styled(value, style.add_modifier(Modifier::BOLD))))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        )
        .alignment(Alignment::Center)
}

fn render_tiles(frame: &mut Frame, stock: &Stock, details: &StockDetails, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let last_price = details
        .last_close()
        .map(format_euros)
        .unwrap_or_else(|| "N/A".to_string());

    let white = Style::default().fg(Color::White);

    // Dernier cours + variation signée du titre
    let price_tile = Paragraph::new(vec![
        Line::from(Span::styled(last_price, white.add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            format_percent(stock.change),
            performance_style(stock.change),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Dernier cours "),
    )
    .alignment(Alignment::Center);

    frame.render_widget(price_tile, columns[0]);
    frame.render_widget(tile(" Volume 24h ", format_volume(details.volume), white), columns[1]);
    frame.render_widget(
        tile(
            " Potentiel mensuel ",
            format_percent(details.monthly_potential),
            performance_style(details.monthly_potential),
        ),
        columns[2],
    );
}

fn render_news(frame: &mut Frame, modal: &DetailsModal, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Actualités ");

    if modal.news().is_empty() {
        let paragraph = Paragraph::new("Aucune actualité")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = modal
        .news()
        .iter()
        .take(MAX_NEWS)
        .map(|article| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    article.title.clone(),
                    Style::default().fg(Color::White),
                )),
                Line::from(Span::styled(
                    article.byline(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled("[1-5 / h l]", key),
        Span::raw(" Plage  "),
        Span::styled("[r]", key),
        Span::raw(" Réessayer  "),
        Span::styled("[ESC]", key),
        Span::raw(" Fermer"),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::modal::FetchOutcome;

    fn apple() -> Stock {
        Stock::new(
            "AAPL".to_string(),
            "Apple Inc.".to_string(),
            "NASDAQ".to_string(),
            150.0,
            1.2,
        )
    }

    fn loaded(volume: u64) -> StockDetails {
        StockDetails {
            volume,
            ..StockDetails::default()
        }
    }

    fn screen_text(modal: &DetailsModal) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|frame| render_details_modal(frame, modal))
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    /// Fenêtre ouverte sur AAPL avec des données 1M appliquées
    fn modal_with_data() -> DetailsModal {
        let mut modal = DetailsModal::new();
        let request = modal.open(apple());
        modal.apply(FetchOutcome {
            request,
            result: Ok((loaded(4_242_424), Vec::new())),
        });
        modal
    }

    #[test]
    fn test_closed_modal_draws_nothing() {
        let text = screen_text(&DetailsModal::new());
        assert!(!text.contains("AAPL"));
    }

    #[test]
    fn test_data_state_shows_tiles() {
        let text = screen_text(&modal_with_data());

        assert!(text.contains("Volume 24h"));
        assert!(text.contains("4 242 424"));
        assert!(text.contains("Dernier cours"));
        assert!(text.contains("+1.20%"));
        assert!(!text.contains("Chargement des données"));
    }

    #[test]
    fn test_range_change_hides_previous_data() {
        let mut modal = modal_with_data();
        modal.select_range(TimeRange::OneYear).unwrap();

        let text = screen_text(&modal);
        assert!(text.contains("Chargement des données"));
        assert!(!text.contains("4 242 424"));
        assert!(!text.contains("Volume 24h"));
    }

    #[test]
    fn test_retry_hides_error_and_data() {
        let mut modal = modal_with_data();
        let request = modal.select_range(TimeRange::FiveYears).unwrap();
        modal.apply(FetchOutcome {
            request,
            result: Err(anyhow!("délai dépassé")),
        });

        let text = screen_text(&modal);
        assert!(text.contains("Impossible de charger les données"));
        assert!(text.contains("délai dépassé"));
        assert!(!text.contains("Volume 24h"));

        modal.retry().unwrap();
        let text = screen_text(&modal);
        assert!(text.contains("Chargement des données"));
        assert!(!text.contains("Impossible de charger"));
        assert!(!text.contains("4 242 424"));
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(80, 80, area);

        assert_eq!(rect.width, 80);
        assert_eq!(rect.height, 40);
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 5);
    }
}
