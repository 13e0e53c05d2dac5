// ============================================================================
// Graphique en chandeliers japonais (rendu texte)
// ============================================================================
// Dessine l'historique OHLC de la fenêtre de détails avec des caractères
// Unicode, ligne par ligne de haut en bas.
//
// ALGORITHME (3 zones par chandelier) :
// - Mèche supérieure : high → max(open, close)
// - Corps : max → min
// - Mèche inférieure : min(open, close) → low
// - Seuils fractionnaires (0.25, 0.75) pour une précision sub-caractère
//
// Le graphique est recalculé à chaque frame à partir de la zone reçue :
// un redimensionnement du terminal est pris en compte au dessin suivant.
//
// CARACTÈRES UNICODE :
// ┃ Corps plein          │ Mèche pleine
// ╻ Demi-corps (bas)     ╹ Demi-corps (haut)
// ╽ Transition top       ╿ Transition bottom
// ╷ Demi-mèche sup       ╵ Demi-mèche inf
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{OHLC, TimeRange};

const UNICODE_VOID: char = ' ';
const UNICODE_BODY: char = '┃';
const UNICODE_HALF_BODY_BOTTOM: char = '╻';
const UNICODE_HALF_BODY_TOP: char = '╹';
const UNICODE_WICK: char = '│';
const UNICODE_TOP: char = '╽';
const UNICODE_BOTTOM: char = '╿';
const UNICODE_UPPER_WICK: char = '╷';
const UNICODE_LOWER_WICK: char = '╵';

pub const BULLISH_COLOR: Color = Color::Rgb(52, 208, 88);
pub const BEARISH_COLOR: Color = Color::Rgb(234, 74, 90);

/// Largeur de l'axe Y ("  12345.67 │ ")
const Y_AXIS_WIDTH: u16 = 12;

/// En dessous, on n'essaie pas de dessiner
const MIN_CHART_WIDTH: u16 = 30;
const MIN_CHART_HEIGHT: u16 = 5;

/// Lignes réservées à l'axe X (ticks + labels)
const X_AXIS_HEIGHT: u16 = 2;

/// Renderer de chandeliers pour une zone donnée
pub struct CandlestickRenderer<'a> {
    candles: &'a [OHLC],
    range: TimeRange,
    min_price: f64,
    max_price: f64,
    height: u16,
    width: u16,
}

impl<'a> CandlestickRenderer<'a> {
    /// Crée un renderer dimensionné sur `area` (intérieur du cadre)
    pub fn new(candles: &'a [OHLC], range: TimeRange, area: Rect) -> Self {
        let (min_price, max_price) = padded_bounds(candles);

        Self {
            candles,
            range,
            min_price,
            max_price,
            height: area.height.saturating_sub(X_AXIS_HEIGHT),
            width: area.width.saturating_sub(Y_AXIS_WIDTH),
        }
    }

    /// Convertit un prix en coordonnée de hauteur
    fn price_to_height(&self, price: f64) -> f64 {
        if self.max_price == self.min_price {
            return self.height as f64 / 2.0;
        }

        (price - self.min_price) / (self.max_price - self.min_price) * self.height as f64
    }

    fn candle_color(candle: &OHLC) -> Color {
        if candle.is_bullish() {
            BULLISH_COLOR
        } else {
            BEARISH_COLOR
        }
    }

    /// Caractère d'un chandelier à la hauteur `y`
    fn render_candle(&self, candle: &OHLC, y: u16) -> char {
        let height_unit = y as f64;

        let high_y = self.price_to_height(candle.high);
        let low_y = self.price_to_height(candle.low);
        let max_y = self.price_to_height(candle.open.max(candle.close));
        let min_y = self.price_to_height(candle.close.min(candle.open));

        // Zone 1 : mèche supérieure
        if high_y.ceil() >= height_unit && height_unit >= max_y.floor() {
            if max_y - height_unit > 0.75 {
                UNICODE_BODY
            } else if max_y - height_unit > 0.25 {
                if high_y - height_unit > 0.75 {
                    UNICODE_TOP
                } else {
                    UNICODE_HALF_BODY_BOTTOM
                }
            } else if high_y - height_unit > 0.75 {
                UNICODE_WICK
            } else if high_y - height_unit > 0.25 {
                UNICODE_UPPER_WICK
            } else {
                UNICODE_VOID
            }
        }
        // Zone 2 : corps
        else if max_y.floor() >= height_unit && height_unit >= min_y.ceil() {
            UNICODE_BODY
        }
        // Zone 3 : mèche inférieure
        else if min_y.ceil() >= height_unit && height_unit >= low_y.floor() {
            if min_y - height_unit < 0.25 {
                UNICODE_BODY
            } else if min_y - height_unit < 0.75 {
                if low_y - height_unit < 0.25 {
                    UNICODE_BOTTOM
                } else {
                    UNICODE_HALF_BODY_TOP
                }
            } else if low_y - height_unit < 0.25 {
                UNICODE_WICK
            } else if low_y - height_unit < 0.75 {
                UNICODE_LOWER_WICK
            } else {
                UNICODE_VOID
            }
        } else {
            UNICODE_VOID
        }
    }

    /// Label de l'axe Y (un prix toutes les 4 lignes)
    fn render_y_axis(&self, y: u16) -> String {
        if y % 4 == 0 {
            let price = self.min_price
                + (y as f64 * (self.max_price - self.min_price) / self.height as f64);
            format!("{:>9.2} │ ", price)
        } else {
            format!("{:>9} │ ", "")
        }
    }

    /// Les N derniers chandeliers qui tiennent dans la largeur
    fn visible_candles(&self) -> &'a [OHLC] {
        let max_visible = self.width as usize;
        let start = self.candles.len().saturating_sub(max_visible);
        &self.candles[start..]
    }

    /// Colonne de chaque chandelier, calculée depuis l'index (pas de drift)
    fn column_of(&self, index: usize, count: usize) -> usize {
        let width = self.width as usize;
        if count <= 1 {
            return width / 2;
        }
        let spacing = width as f64 / count as f64;
        ((index as f64 * spacing).round() as usize).min(width.saturating_sub(1))
    }

    /// Génère toutes les lignes (chandeliers puis axe X)
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let visible = self.visible_candles();
        if visible.is_empty() || self.height == 0 || self.width == 0 {
            return Vec::new();
        }

        let columns: Vec<usize> = (0..visible.len())
            .map(|i| self.column_of(i, visible.len()))
            .collect();

        let mut lines = Vec::with_capacity(self.height as usize + X_AXIS_HEIGHT as usize);

        for y in (1..=self.height).rev() {
            let mut spans = vec![Span::styled(
                self.render_y_axis(y),
                Style::default().fg(Color::Gray),
            )];

            let mut cursor = 0;
            for (candle, &column) in visible.iter().zip(&columns) {
                if column > cursor {
                    spans.push(Span::raw(" ".repeat(column - cursor)));
                }
                spans.push(Span::styled(
                    self.render_candle(candle, y).to_string(),
                    Style::default().fg(Self::candle_color(candle)),
                ));
                cursor = column + 1;
            }

            lines.push(Line::from(spans));
        }

        lines.extend(self.render_x_axis(visible, &columns));
        lines
    }

    /// Ticks + labels de temps, espacés pour ne jamais se chevaucher
    fn render_x_axis(&self, visible: &[OHLC], columns: &[usize]) -> Vec<Line<'static>> {
        let format = self.range.axis_format();
        let label_width = visible
            .first()
            .map(|c| c.timestamp.format(format).to_string().chars().count())
            .unwrap_or(5);

        let max_labels = (self.width as usize / (label_width + 2)).clamp(2, 10);
        let step = (visible.len() / max_labels).max(1);

        let padding = " ".repeat(Y_AXIS_WIDTH as usize);
        let mut ticks = padding.clone();
        let mut labels = padding;
        let mut tick_cursor = 0;
        let mut label_cursor = 0;

        for (i, (candle, &column)) in visible.iter().zip(columns).enumerate() {
            if i % step != 0 {
                continue;
            }

            ticks.push_str(&" ".repeat(column.saturating_sub(tick_cursor)));
            ticks.push('│');
            tick_cursor = column + 1;

            // Un label qui chevaucherait le précédent est sauté
            if column < label_cursor {
                continue;
            }
            let label = candle.timestamp.format(format).to_string();
            labels.push_str(&" ".repeat(column - label_cursor));
            label_cursor = column + label.chars().count() + 1;
            labels.push_str(&label);
            labels.push(' ');
        }

        let style = Style::default().fg(Color::Gray);
        vec![
            Line::from(Span::styled(ticks, style)),
            Line::from(Span::styled(labels, style)),
        ]
    }
}

/// Bornes de prix avec 2% de marge
fn padded_bounds(candles: &[OHLC]) -> (f64, f64) {
    match crate::models::ohlc::price_bounds(candles) {
        Some((min, max)) => {
            let margin = (max - min) * 0.02;
            ((min - margin).max(0.0), max + margin)
        }
        None => (0.0, 0.0),
    }
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine le graphique d'une série dans `area`
pub fn render_chart(frame: &mut Frame, candles: &[OHLC], range: TimeRange, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" Historique {} ({} chandeliers) ", range.label(), candles.len()));

    let inner = block.inner(area);

    if candles.is_empty() {
        let paragraph = Paragraph::new("Aucune donnée historique")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    // CONCEPT : Graceful degradation pour terminaux étroits
    if inner.width < MIN_CHART_WIDTH || inner.height < MIN_CHART_HEIGHT {
        let paragraph = Paragraph::new("Terminal trop petit pour le graphique")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines = CandlestickRenderer::new(candles, range, inner).render_lines();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(count: usize) -> Vec<OHLC> {
        let start = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64;
                OHLC::new(
                    start + Duration::days(i as i64),
                    base,
                    base + 2.0,
                    base - 2.0,
                    base + 1.0,
                    1_000,
                )
            })
            .collect()
    }

    #[test]
    fn test_render_lines_fills_area() {
        let data = candles(20);
        let area = Rect::new(0, 0, 60, 14);
        let renderer = CandlestickRenderer::new(&data, TimeRange::OneMonth, area);

        let lines = renderer.render_lines();
        assert_eq!(lines.len(), 14); // 12 lignes de chandeliers + 2 d'axe
    }

    #[test]
    fn test_only_last_candles_visible() {
        let data = candles(100);
        let area = Rect::new(0, 0, Y_AXIS_WIDTH + 10, 10);
        let renderer = CandlestickRenderer::new(&data, TimeRange::OneYear, area);

        let visible = renderer.visible_candles();
        assert_eq!(visible.len(), 10);
        assert_eq!(visible[9].close, data[99].close);
    }

    #[test]
    fn test_body_character() {
        let data = vec![OHLC::new(Utc::now(), 0.0, 10.0, 0.0, 10.0, 0)];
        let renderer = CandlestickRenderer {
            candles: &data,
            range: TimeRange::OneDay,
            min_price: 0.0,
            max_price: 10.0,
            height: 10,
            width: 10,
        };

        assert_eq!(renderer.render_candle(&data[0], 5), UNICODE_BODY);
    }

    #[test]
    fn test_columns_stay_in_bounds() {
        let data = candles(7);
        let area = Rect::new(0, 0, Y_AXIS_WIDTH + 40, 10);
        let renderer = CandlestickRenderer::new(&data, TimeRange::OneMonth, area);

        let columns: Vec<usize> = (0..7).map(|i| renderer.column_of(i, 7)).collect();
        assert_eq!(columns[0], 0);
        assert!(columns.windows(2).all(|w| w[0] < w[1]));
        assert!(*columns.last().unwrap() < 40);
    }

    #[test]
    fn test_empty_series() {
        let area = Rect::new(0, 0, 60, 14);
        let renderer = CandlestickRenderer::new(&[], TimeRange::OneMonth, area);
        assert!(renderer.render_lines().is_empty());
    }
}
