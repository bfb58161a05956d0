//! Dashboard sections and their OpenProject counterparts.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Boards,
    Meetings,
    Wiki,
    TeamPlanner,
    Projects,
}

impl Section {
    pub const ALL: [Self; 5] = [Self::Boards, Self::Meetings, Self::Wiki, Self::TeamPlanner, Self::Projects];

    /// Route segment under the app root.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Boards => "boards",
            Self::Meetings => "meetings",
            Self::Wiki => "wiki",
            Self::TeamPlanner => "team-planner",
            Self::Projects => "projects",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    pub fn path(self) -> String {
        format!("/{}", self.slug())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Boards => "Boards",
            Self::Meetings => "Meetings",
            Self::Wiki => "Wiki",
            Self::TeamPlanner => "Team Planner",
            Self::Projects => "Projects",
        }
    }

    /// Single-glyph marker shown when the sidebar is collapsed.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Boards => "▦",
            Self::Meetings => "◷",
            Self::Wiki => "✎",
            Self::TeamPlanner => "☰",
            Self::Projects => "◆",
        }
    }

    fn openproject_segment(self) -> &'static str {
        match self {
            Self::Boards => "boards",
            Self::Meetings => "meetings",
            Self::Wiki => "wiki",
            Self::TeamPlanner => "team_planners",
            Self::Projects => "projects",
        }
    }

    /// Deep link into the OpenProject instance at `base`.
    pub fn openproject_url(self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.openproject_segment())
    }
}

/// Section owning `path`, matching the first path segment.
pub fn section_for_path(path: &str) -> Option<Section> {
    let first = path.trim_start_matches('/').split('/').next()?;
    Section::from_slug(first)
}
