//! Portfolio filtering by category.

use super::{Category, Project};

/// Active portfolio filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
  #[default]
  All,
  Category(String),
}

impl Filter {
  pub fn matches(&self, project: &Project) -> bool {
    match self {
      Filter::All => true,
      Filter::Category(id) => project.category == *id,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct Portfolio {
  projects: Vec<Project>,
  categories: Vec<Category>,
  filter: Filter,
}

impl Portfolio {
  pub fn new(projects: Vec<Project>, categories: Vec<Category>) -> Self {
    Self {
      projects,
      categories,
      filter: Filter::All,
    }
  }

  pub fn projects(&self) -> &[Project] {
    &self.projects
  }

  pub fn filter(&self) -> &Filter {
    &self.filter
  }

  #[cfg(test)]
  pub fn set_filter(&mut self, filter: Filter) {
    self.filter = filter;
  }

  /// Projects matching the current filter, in configured order.
  pub fn visible(&self) -> Vec<&Project> {
    self
      .projects
      .iter()
      .filter(|p| self.filter.matches(p))
      .collect()
  }

  /// `All` followed by one filter per category.
  pub fn filters(&self) -> Vec<Filter> {
    std::iter::once(Filter::All)
      .chain(
        self
          .categories
          .iter()
          .map(|c| Filter::Category(c.id.clone())),
      )
      .collect()
  }

  /// Move to the previous or next filter, wrapping around.
  pub fn cycle_filter(&mut self, direction: i32) {
    let filters = self.filters();
    let current = filters.iter().position(|f| *f == self.filter).unwrap_or(0);
    let next = (current as i32 + direction).rem_euclid(filters.len() as i32) as usize;
    self.filter = filters[next].clone();
  }

  /// Display label for a filter.
  pub fn label(&self, filter: &Filter) -> String {
    match filter {
      Filter::All => "All".to_string(),
      Filter::Category(id) => self
        .categories
        .iter()
        .find(|c| c.id == *id)
        .map(|c| c.label.clone())
        .unwrap_or_else(|| id.clone()),
    }
  }
}
