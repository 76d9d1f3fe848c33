use crate::model::{Status, Todo};
use error_stack::Report;
use norm_core::{QueryBuilder, QueryError, QueryMapper, QueryResult};
use repositories::memory::MemoryQuery;

/// Builder calls [`TodoQueryMapper`] needs from a store.
#[cfg_attr(test, mockall::automock)]
pub trait TodoQueryBuilder: QueryBuilder {
    fn equals(&mut self, field: &str, value: &str);
    fn contains(&mut self, field: &str, needle: &str);
}

impl TodoQueryBuilder for MemoryQuery<Todo> {
    fn equals(&mut self, field: &str, value: &str) {
        MemoryQuery::equals(self, field, value);
    }

    fn contains(&mut self, field: &str, needle: &str) {
        MemoryQuery::contains(self, field, needle);
    }
}

/// Records which todos a caller is after.
#[derive(Debug, Default)]
pub struct TodoQueryMapper {
    status: Option<Status>,
    conflicting: bool,
    title: Option<String>,
    tag: Option<String>,
}

impl TodoQueryMapper {
    pub fn closed_tasks(&mut self) {
        self.with_status(Status::Closed);
    }

    pub fn open_tasks(&mut self) {
        self.with_status(Status::Open);
    }

    pub fn title_contains(&mut self, text: &str) {
        self.title = Some(text.to_string());
    }

    pub fn tagged(&mut self, tag: &str) {
        self.tag = Some(tag.to_string());
    }

    fn with_status(&mut self, status: Status) {
        self.conflicting |= self.status.is_some_and(|s| s != status);
        self.status = Some(status);
    }
}

impl<B: TodoQueryBuilder> QueryMapper<B> for TodoQueryMapper {
    fn apply(&self, query_builder: &mut B) -> QueryResult<()> {
        if self.conflicting {
            return Err(Report::new(QueryError).attach("a todo cannot be both open and closed"));
        }

        if let Some(status) = self.status {
            query_builder.equals("status", status.as_str());
        }
        if let Some(title) = &self.title {
            query_builder.contains("title", title);
        }
        if let Some(tag) = &self.tag {
            query_builder.contains("tags", tag);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    impl QueryBuilder for MockTodoQueryBuilder {}

    #[test]
    fn closed_tasks_filters_on_closed_status() {
        let mut mapper = TodoQueryMapper::default();
        mapper.closed_tasks();

        let mut builder = MockTodoQueryBuilder::new();
        builder
            .expect_equals()
            .with(eq("status"), eq("CLOSED"))
            .times(1)
            .return_const(());
        builder.expect_contains().never();

        mapper.apply(&mut builder).unwrap();
    }

    #[test]
    fn title_and_tag_become_contains_calls() {
        let mut mapper = TodoQueryMapper::default();
        mapper.title_contains("milk");
        mapper.tagged("errand");

        let mut builder = MockTodoQueryBuilder::new();
        builder.expect_equals().never();
        builder
            .expect_contains()
            .with(eq("title"), eq("milk"))
            .times(1)
            .return_const(());
        builder
            .expect_contains()
            .with(eq("tags"), eq("errand"))
            .times(1)
            .return_const(());

        mapper.apply(&mut builder).unwrap();
    }

    #[test]
    fn open_and_closed_together_is_rejected() {
        let mut mapper = TodoQueryMapper::default();
        mapper.open_tasks();
        mapper.closed_tasks();

        let mut builder = MockTodoQueryBuilder::new();
        builder.expect_equals().never();
        builder.expect_contains().never();

        assert!(mapper.apply(&mut builder).is_err());
    }

    #[test]
    fn asking_for_the_same_status_twice_is_fine() {
        let mut mapper = TodoQueryMapper::default();
        mapper.open_tasks();
        mapper.open_tasks();

        let mut builder = MockTodoQueryBuilder::new();
        builder.expect_equals().times(1).return_const(());

        mapper.apply(&mut builder).unwrap();
    }

    #[test]
    fn applies_to_memory_query() {
        let mut mapper = TodoQueryMapper::default();
        mapper.closed_tasks();
        mapper.tagged("chore");

        let mut query = MemoryQuery::<Todo>::new();
        mapper.apply(&mut query).unwrap();

        let mut closed_chore = Todo::new("sweep").tagged("chore");
        closed_chore.close();

        assert!(query.matches(&closed_chore).unwrap());
        assert!(!query.matches(&Todo::new("sweep").tagged("chore")).unwrap());
        assert_eq!(
            r#"status = "CLOSED" and tags contains "chore""#,
            query.to_string()
        );
    }
}
