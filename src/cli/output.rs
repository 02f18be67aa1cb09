//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the relay CLI.

use owo_colors::OwoColorize;

const COLUMN_WIDTH: usize = 24;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                r#"
   {}
   {}
   {}
   {}
"#,
                " ___ ___ _      _ __   __".bright_cyan().bold(),
                "| _ \\ __| |    /_\\\\ \\ / /".cyan().bold(),
                "|   / _|| |__ / _ \\\\ V / ".blue().bold(),
                "|_|_\\___|____/_/ \\_\\|_|  ".blue().bold(),
            );
            println!(
                "   {} {}\n",
                "Multi-agent streaming relay".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                r#"
 ___ ___ _      _ __   __
| _ \ __| |    /_\\ \ / /
|   / _|| |__ / _ \\ V /
|_|_\___|____/_/ \_\|_|

   Multi-agent streaming relay v{}
"#,
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a table header row
    pub fn table_header(&self, columns: &[&str]) {
        let header = Self::format_row(columns);
        let rule_width = columns.len() * (COLUMN_WIDTH + 1);
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(rule_width).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(rule_width));
        }
    }

    /// Print a table row
    pub fn table_row(&self, values: &[&str]) {
        println!("    {}", Self::format_row(values));
    }

    fn format_row(values: &[&str]) -> String {
        values
            .iter()
            .map(|v| format!("{:<width$}", v, width = COLUMN_WIDTH))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}
