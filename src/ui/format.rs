// ============================================================================
// Formatage des montants et pourcentages
// ============================================================================
// Conventions françaises : séparateur de milliers = espace, symbole € après
// le montant, deux décimales.
// ============================================================================

/// Groupe les chiffres par milliers ("1234567" → "1 234 567")
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    grouped
}

/// Montant en euros : "2 900.00€", "-12.50€"
pub fn format_euros(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let formatted = format!("{:.2}", value.abs());
    let (integer, decimals) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };

    format!("{}{}.{}€", sign, group_thousands(integer), decimals)
}

/// Pourcentage signé : "+2.50%", "-1.20%", "0.00%"
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    if value == 0.0 {
        return "0.00%".to_string();
    }
    format!("{:+.2}%", value)
}

/// Pourcentage optionnel ("N/A" si absent)
pub fn format_optional_percent(value: Option<f64>) -> String {
    value.map(format_percent).unwrap_or_else(|| "N/A".to_string())
}

/// Volume entier groupé par milliers : "12 345 678"
pub fn format_volume(volume: u64) -> String {
    group_thousands(&volume.to_string())
}

/// Quantité : entière sans décimales, sinon jusqu'à 4 décimales
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        let formatted = format!("{:.4}", quantity);
        formatted.trim_end_matches('0').to_string()
    }
}
