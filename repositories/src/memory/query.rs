use error_stack::ResultExt;
use itertools::Itertools;
use norm_core::{QueryBuilder, QueryError, QueryResult};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

/// One condition of a [`MemoryQuery`]. Fields are `.` separated paths into the model as it
/// serializes to JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals(String, Value),
    NotEquals(String, Value),
    IsNull(String),
    /// Substring of a string field, or element of an array of strings. A null field contains
    /// nothing.
    Contains(String, String),
    All(Vec<Filter>),
    Any(Vec<Filter>),
}

impl Filter {
    fn evaluate(&self, model: &Value) -> QueryResult<bool> {
        match self {
            Filter::Equals(field, value) => Ok(lookup(model, field)? == value),
            Filter::NotEquals(field, value) => Ok(lookup(model, field)? != value),
            Filter::IsNull(field) => Ok(lookup(model, field)?.is_null()),
            Filter::Contains(field, needle) => match lookup(model, field)? {
                Value::String(s) => Ok(s.contains(needle.as_str())),
                Value::Array(items) => {
                    let mut found = false;
                    for item in items {
                        let item = item.as_str().ok_or(QueryError).attach_with(|| {
                            format!("`{field}` holds {item}, which is not an array of strings")
                        })?;
                        found |= item == needle;
                    }
                    Ok(found)
                }
                Value::Null => Ok(false),
                other => Err(QueryError).attach_with(|| {
                    format!("`{field}` holds {other}, which cannot contain {needle:?}")
                }),
            },
            Filter::All(filters) => {
                for filter in filters {
                    if !filter.evaluate(model)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Any(filters) => {
                for filter in filters {
                    if filter.evaluate(model)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

static NULL: Value = Value::Null;

/// A path running through a null parent resolves to null.
fn lookup<'a>(model: &'a Value, path: &str) -> QueryResult<&'a Value> {
    path.split('.').try_fold(model, |value, segment| {
        if value.is_null() {
            return Ok(&NULL);
        }
        value
            .get(segment)
            .ok_or(QueryError)
            .attach_with(|| format!("unknown field `{path}`"))
    })
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Equals(field, value) => write!(f, "{field} = {value}"),
            Filter::NotEquals(field, value) => write!(f, "{field} != {value}"),
            Filter::IsNull(field) => write!(f, "{field} is null"),
            Filter::Contains(field, needle) => write!(f, "{field} contains {needle:?}"),
            Filter::All(filters) if filters.is_empty() => write!(f, "true"),
            Filter::Any(filters) if filters.is_empty() => write!(f, "false"),
            Filter::All(filters) => write!(f, "{}", filters.iter().map(Grouped).join(" and ")),
            Filter::Any(filters) => write!(f, "{}", filters.iter().map(Grouped).join(" or ")),
        }
    }
}

/// Parenthesizes nested groups of more than one filter.
struct Grouped<'a>(&'a Filter);

impl Display for Grouped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Filter::All(filters) | Filter::Any(filters) if filters.len() > 1 => {
                write!(f, "({})", self.0)
            }
            filter => write!(f, "{filter}"),
        }
    }
}

/// Query builder of the in-memory store.
///
/// Top level filters are and-ed together, so an empty query matches every model.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryQuery<M> {
    filters: Vec<Filter>,
    _model: PhantomData<fn(&M)>,
}

impl<M> Default for MemoryQuery<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder for MemoryQuery<M> {}

impl<M> MemoryQuery<M> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            _model: PhantomData,
        }
    }

    pub fn equals(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(Filter::Equals(field.into(), value.into()))
    }

    pub fn not_equals(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(Filter::NotEquals(field.into(), value.into()))
    }

    pub fn is_null(&mut self, field: impl Into<String>) -> &mut Self {
        self.push(Filter::IsNull(field.into()))
    }

    pub fn contains(&mut self, field: impl Into<String>, needle: impl Into<String>) -> &mut Self {
        self.push(Filter::Contains(field.into(), needle.into()))
    }

    /// Every filter added by `group` must match. An empty group matches everything.
    pub fn and(&mut self, group: impl FnOnce(&mut Self)) -> &mut Self {
        let filters = self.collect_group(group);
        self.push(Filter::All(filters))
    }

    /// At least one filter added by `group` must match. An empty group matches nothing.
    pub fn or(&mut self, group: impl FnOnce(&mut Self)) -> &mut Self {
        let filters = self.collect_group(group);
        self.push(Filter::Any(filters))
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    fn push(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    fn collect_group(&self, group: impl FnOnce(&mut Self)) -> Vec<Filter> {
        let mut inner = Self::new();
        group(&mut inner);
        inner.filters
    }
}

impl<M> MemoryQuery<M>
where
    M: Serialize,
{
    pub fn matches(&self, model: &M) -> QueryResult<bool> {
        let value = serde_json::to_value(model)
            .change_context(QueryError)
            .attach("model could not be serialized for filtering")?;
        self.matches_value(&value)
    }

    fn matches_value(&self, value: &Value) -> QueryResult<bool> {
        for filter in &self.filters {
            if !filter.evaluate(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<M> Display for MemoryQuery<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.filters.is_empty() {
            return write!(f, "everything");
        }
        write!(f, "{}", self.filters.iter().map(Grouped).join(" and "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::Report;
    use error_stack::fmt::ColorMode;

    #[derive(Serialize)]
    struct Author {
        name: String,
    }

    #[derive(Serialize)]
    struct Book {
        title: String,
        subtitle: Option<String>,
        pages: u32,
        author: Author,
        editor: Option<Author>,
        tags: Vec<String>,
        chapters: Vec<u32>,
    }

    fn dune() -> Book {
        Book {
            title: "Dune".to_string(),
            subtitle: None,
            pages: 412,
            author: Author {
                name: "Herbert".to_string(),
            },
            editor: None,
            tags: vec!["classic".to_string(), "desert".to_string()],
            chapters: vec![1, 2, 3],
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = MemoryQuery::<Book>::new();

        assert!(query.matches(&dune()).unwrap());
    }

    #[test]
    fn equals_follows_nested_paths() {
        let mut query = MemoryQuery::<Book>::new();
        query.equals("author.name", "Herbert").equals("pages", 412);

        assert!(query.matches(&dune()).unwrap());
    }

    #[test]
    fn top_level_filters_are_and_ed() {
        let mut query = MemoryQuery::<Book>::new();
        query.equals("title", "Dune").not_equals("pages", 412);

        assert!(!query.matches(&dune()).unwrap());
    }

    #[test]
    fn or_group_matches_if_any_filter_matches() {
        let mut query = MemoryQuery::<Book>::new();
        query.or(|q| {
            q.equals("title", "Emma").equals("author.name", "Herbert");
        });

        assert!(query.matches(&dune()).unwrap());
    }

    #[test]
    fn empty_or_group_matches_nothing() {
        let mut query = MemoryQuery::<Book>::new();
        query.or(|_| {});

        assert!(!query.matches(&dune()).unwrap());
    }

    #[test]
    fn empty_and_group_matches_everything() {
        let mut query = MemoryQuery::<Book>::new();
        query.and(|_| {});

        assert!(query.matches(&dune()).unwrap());
    }

    #[test]
    fn is_null_matches_missing_option() {
        let mut query = MemoryQuery::<Book>::new();
        query.is_null("subtitle");

        assert!(query.matches(&dune()).unwrap());
    }

    #[test]
    fn field_under_missing_parent_is_null() {
        let mut query = MemoryQuery::<Book>::new();
        query.is_null("editor.name");

        assert!(query.matches(&dune()).unwrap());

        let mut query = MemoryQuery::<Book>::new();
        query.equals("editor.name", "Campbell");

        assert!(!query.matches(&dune()).unwrap());

        let mut query = MemoryQuery::<Book>::new();
        query.contains("editor.name", "Camp");

        assert!(!query.matches(&dune()).unwrap());
    }

    #[test]
    fn unknown_field_under_present_parent_still_fails() {
        let mut query = MemoryQuery::<Book>::new();
        query.is_null("author.age");

        assert!(query.matches(&dune()).is_err());
    }

    #[test]
    fn contains_on_an_array_of_numbers_fails() {
        let mut query = MemoryQuery::<Book>::new();
        query.contains("chapters", "1");

        assert!(query.matches(&dune()).is_err());
    }

    #[test]
    fn contains_checks_strings_and_string_arrays() {
        let mut query = MemoryQuery::<Book>::new();
        query.contains("title", "un").contains("tags", "desert");

        assert!(query.matches(&dune()).unwrap());

        let mut query = MemoryQuery::<Book>::new();
        query.contains("tags", "des");

        assert!(!query.matches(&dune()).unwrap());
    }

    #[test]
    fn contains_on_a_number_fails() {
        let mut query = MemoryQuery::<Book>::new();
        query.contains("pages", "4");

        assert!(query.matches(&dune()).is_err());
    }

    #[test]
    fn unknown_field_fails() {
        Report::set_color_mode(ColorMode::None);
        let mut query = MemoryQuery::<Book>::new();
        query.equals("author.age", 80);

        let err = query.matches(&dune()).unwrap_err();

        assert!(format!("{err:?}").contains("unknown field `author.age`"));
    }

    #[test]
    fn display_groups_nested_filters() {
        let mut query = MemoryQuery::<Book>::new();
        query.equals("title", "Dune").or(|q| {
            q.equals("pages", 412).is_null("subtitle");
        });

        assert_eq!(
            r#"title = "Dune" and (pages = 412 or subtitle is null)"#,
            query.to_string()
        );
    }

    #[test]
    fn display_of_empty_query() {
        assert_eq!("everything", MemoryQuery::<Book>::new().to_string());
    }
}
