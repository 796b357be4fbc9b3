use std::hash::Hasher;

use colored::{Color, Colorize};
use metrohash::MetroHash64;
use supports_color::Stream;

use crate::engine::TreeView;
use crate::tree::{strip_label_padding, ChangelistTree};

/// Colors assigned to changelist labels, keyed by name hash so a changelist
/// keeps its color across runs.
const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

fn name_color(name: &str) -> Color {
    let mut hasher = MetroHash64::default();
    hasher.write(name.as_bytes());
    PALETTE[(hasher.finish() % PALETTE.len() as u64) as usize]
}

/// Prints the whole tree: one padded label line per changelist, members
/// indented beneath it.
pub fn render_tree(tree: &ChangelistTree) {
    if tree.is_empty() {
        println!("(no changelists)");
        return;
    }

    let colorize = supports_color::on(Stream::Stdout).is_some();
    let view = TreeView::new(tree);

    for label in view.children(None) {
        let name = strip_label_padding(&label);
        if colorize {
            println!("{}", label.color(name_color(name)).bold());
        } else {
            println!("{label}");
        }

        for member in view.children(Some(name)) {
            println!("  {member}");
        }
    }
}
