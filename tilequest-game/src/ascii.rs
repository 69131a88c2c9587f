//! Text art lookup with a boxed fallback.
use crate::AsciiLoader;
use crate::world::Tile;

/// File name an art lookup uses for a tile: the explicit reference, or the
/// tile name in snake case with a `.txt` suffix.
#[must_use]
pub fn art_name(tile: &Tile) -> String {
    match tile.ascii.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{}.txt", tile.name.to_lowercase().replace(' ', "_")),
    }
}

/// Art for a tile, falling back to a titled placeholder box.
#[must_use]
pub fn render_room(tile: &Tile, loader: &dyn AsciiLoader) -> String {
    loader
        .load_art(&art_name(tile))
        .filter(|art| !art.is_empty())
        .unwrap_or_else(|| boxed("[ --- ]", Some(&tile.name)))
}

/// Art for an enemy. Unresolvable references are shown verbatim.
#[must_use]
pub fn render_enemy(reference: &str, loader: &dyn AsciiLoader) -> String {
    loader
        .load_art(reference)
        .filter(|art| !art.is_empty())
        .unwrap_or_else(|| reference.to_string())
}

/// Draw `text` inside an ASCII border, with an optional title row.
#[must_use]
pub fn boxed(text: &str, title: Option<&str>) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .chain(title.map(|t| t.chars().count()))
        .max()
        .unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width + 2));
    let mut out = vec![border.clone()];
    if let Some(title) = title {
        out.push(format!("| {title:<width$} |"));
        out.push(format!("| {} |", "-".repeat(width)));
    }
    out.extend(lines.iter().map(|line| format!("| {line:<width$} |")));
    out.push(border);
    out.join("\n")
}

#[must_use]
pub fn hp_line(label: &str, current: i32, max: i32) -> String {
    format!("{label}: {current}/{max}")
}
