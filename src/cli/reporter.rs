// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use colored::*;
use std::path::Path;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a successfully written JSON file
    pub fn report_saved(path: &Path) {
        println!("{}", Self::saved_line(path));
    }

    /// Report error
    pub fn report_error(message: &str) {
        println!("{}", Self::error_line(message));
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{}", message);
    }

    fn saved_line(path: &Path) -> String {
        format!(
            "{} {}",
            "✅ JSON file saved successfully at:".green(),
            path.display().to_string().cyan()
        )
    }

    fn error_line(message: &str) -> String {
        format!("{} {}", "❌ Error:".red().bold(), message)
    }
}
