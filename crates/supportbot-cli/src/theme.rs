use crossterm::style::{Color, Stylize};
use supportbot_core::Role;

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub user_color: Color,
    pub assistant_color: Color,
    pub system_color: Color,
    pub muted: Color,
    pub error: Color,
    /// When false every `paint` call returns the text unchanged.
    pub colored: bool,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            user_color: Color::Cyan,
            assistant_color: Color::Green,
            system_color: Color::Yellow,
            muted: Color::DarkGrey,
            error: Color::Rgb {
                r: 247,
                g: 118,
                b: 142,
            },
            colored: true,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            user_color: Color::DarkBlue,
            assistant_color: Color::DarkGreen,
            system_color: Color::DarkMagenta,
            muted: Color::Grey,
            error: Color::DarkRed,
            colored: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            name: "plain",
            colored: false,
            ..Self::dark()
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "plain" | "none" => Self::plain(),
            _ => Self::dark(),
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["dark", "light", "plain"]
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.colored {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold role label such as `you>`.
    pub fn role_prefix(&self, role: Role) -> String {
        let (label, color) = match role {
            Role::User => ("you>", self.user_color),
            Role::Assistant => ("bot>", self.assistant_color),
            Role::System => ("sys>", self.system_color),
        };
        if self.colored {
            label.with(color).bold().to_string()
        } else {
            label.to_string()
        }
    }
}
