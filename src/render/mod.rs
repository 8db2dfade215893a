//! Terminal output: tables, key/value grids and ASCII posters.
//!
//! Rendering writes to stdout only. Fetching a poster is the one network
//! call made from here.

mod poster;

use colored::Colorize;
use reqwest::Client;
use tabled::{Table, Tabled, settings::Style};

use crate::{Res, utils};

pub use poster::ASCII_RAMP;
pub use poster::ascii_lines;
pub use poster::poster_rows;

pub struct Renderer {
    poster_columns: u32,
    http: Client,
}

impl Renderer {
    pub fn new(poster_columns: u32) -> Self {
        Self {
            poster_columns,
            http: Client::new(),
        }
    }

    /// Formats rows as a psql-style table. Returns an empty string for no rows.
    pub fn table_string<T: Tabled>(rows: Vec<T>) -> String {
        if rows.is_empty() {
            return String::new();
        }
        let mut table = Table::new(rows);
        table.with(Style::psql());
        table.to_string()
    }

    /// Prints a titled table; an empty result prints a note instead.
    pub fn table<T: Tabled>(&self, title: &str, rows: Vec<T>) {
        println!("\n{}", title.bold());
        let count = rows.len();
        if count == 0 {
            println!("(no results)");
            return;
        }
        println!("{}", Self::table_string(rows));
        tracing::debug!(title, rows = count, "table rendered");
    }

    /// Prints key/value pairs with bold yellow keys aligned in one column.
    pub fn dict(&self, entries: &[(String, String)]) {
        let width = entries.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        for (key, value) in entries {
            let padded = format!("{:<width$}", key, width = width);
            println!("{}  {}", padded.yellow().bold(), value);
        }
    }

    /// Downloads a poster and prints it as ASCII art.
    ///
    /// Does nothing when poster output is disabled (`poster_columns = 0`).
    pub async fn poster(&self, url: &str) -> Res<()> {
        if self.poster_columns == 0 {
            return Ok(());
        }

        let pb = utils::spinner("Fetching poster...");
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        let bytes = match bytes {
            Ok(response) => response.bytes().await,
            Err(e) => Err(e),
        };
        pb.finish_and_clear();
        let bytes = bytes?;

        let img = image::load_from_memory(&bytes)?;
        let color = colored::control::SHOULD_COLORIZE.should_colorize();
        for line in ascii_lines(&img, self.poster_columns, color) {
            println!("{}", line);
        }
        Ok(())
    }
}
