use chrono::{DateTime, Local};
use teloxide::types::User;

use super::{Segment, SegmentStyle};

/// Printed before every job when headers are enabled: time, sender, a rule and a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub timestamp: DateTime<Local>,
    pub sender: String,
}

impl Header {
    pub fn new(sender: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
        }
    }

    pub fn for_user(user: &User, timestamp: DateTime<Local>) -> Self {
        Self::new(sender_name(user.username.as_deref(), &user.first_name), timestamp)
    }

    pub fn to_segments(&self, line_width: usize) -> Vec<Segment> {
        let bold = SegmentStyle {
            bold: true,
            ..Default::default()
        };

        vec![
            Segment::styled(
                format!("{} {}\n", self.timestamp.format("%Y-%m-%d %H:%M"), self.sender),
                bold,
            ),
            Segment::plain(format!("{}\n\n", "-".repeat(line_width))),
        ]
    }
}

fn sender_name(username: Option<&str>, first_name: &str) -> String {
    match username {
        Some(username) => format!("@{}", username),
        None => first_name.to_string(),
    }
}
