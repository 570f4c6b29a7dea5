//! Bridges from the compiled type graph to execution engines.

/// Execution through the [async-graphql](https://github.com/async-graphql/async-graphql)
/// dynamic schema.
pub mod async_graphql;
