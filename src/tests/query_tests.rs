use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Arguments, Client, ClientError, ContextData, ResolveInfo, Value,
    query::{field, query},
    tests::fixtures::starwars::{self, Database},
};

fn client() -> Client {
    Client::new(&starwars::schema()).expect("Star Wars schema builds")
}

async fn run(doc: &str) -> Result<serde_json::Value, ClientError> {
    client()
        .execute_with(doc, ContextData::new(Database::new()))
        .await
}

#[tokio::test]
async fn test_hero_name() {
    let doc = r#"{
        hero {
            name
        }
    }"#;

    assert_eq!(run(doc).await.unwrap(), json!({"hero": {"name": "R2-D2"}}));
}

#[tokio::test]
async fn test_hero_field_selection() {
    let doc = r#"{
        hero {
            id
            name
        }
    }"#;
    assert_eq!(
        run(doc).await.unwrap(),
        json!({"hero": {"id": "2001", "name": "R2-D2"}}),
    );

    let doc_reversed = r#"{
        hero {
            name
            id
        }
    }"#;
    assert_eq!(
        run(doc_reversed).await.unwrap(),
        json!({"hero": {"name": "R2-D2", "id": "2001"}}),
    );
}

#[tokio::test]
async fn test_hero_name_and_friends() {
    let doc = r#"{
        hero {
            id
            name
            friends {
                name
            }
        }
    }"#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"hero": {
            "id": "2001",
            "name": "R2-D2",
            "friends": [
                {"name": "Luke Skywalker"},
                {"name": "Han Solo"},
                {"name": "Leia Organa"},
            ],
        }}),
    );
}

#[tokio::test]
async fn test_hero_name_and_friends_and_friends_of_friends() {
    let doc = r#"{
        hero {
            id
            name
            friends {
                name
                appearsIn
                friends {
                   name
                }
            }
        }
    }"#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"hero": {
            "id": "2001",
            "name": "R2-D2",
            "friends": [
                {
                    "name": "Luke Skywalker",
                    "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                    "friends": [
                        {"name": "Han Solo"},
                        {"name": "Leia Organa"},
                        {"name": "C-3PO"},
                        {"name": "R2-D2"},
                    ],
                },
                {
                    "name": "Han Solo",
                    "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                    "friends": [
                        {"name": "Luke Skywalker"},
                        {"name": "Leia Organa"},
                        {"name": "R2-D2"},
                    ],
                },
                {
                    "name": "Leia Organa",
                    "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                    "friends": [
                        {"name": "Luke Skywalker"},
                        {"name": "Han Solo"},
                        {"name": "C-3PO"},
                        {"name": "R2-D2"},
                    ],
                },
            ],
        }}),
    );
}

#[tokio::test]
async fn test_query_name() {
    let doc = r#"{ human(id: "1000") { name } }"#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"human": {"name": "Luke Skywalker"}}),
    );
}

#[tokio::test]
async fn test_query_name_from_builder() {
    let schema = starwars::schema();
    let root = schema.query_type();
    let human = schema.declaration("Human").unwrap();

    let doc = query([field(&root["human"]).arg("id", "1000").get([&human["name"]])]);
    assert_eq!(
        doc.to_string(),
        "query {\n  human(id: \"1000\") {\n    name\n  }\n}",
    );

    let data = Client::new(&schema)
        .unwrap()
        .execute_with(doc.to_string(), ContextData::new(Database::new()))
        .await
        .unwrap();
    assert_eq!(data, json!({"human": {"name": "Luke Skywalker"}}));
}

#[tokio::test]
async fn test_query_alias_single() {
    let doc = r#"{ luke: human(id: "1000") { name } }"#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"luke": {"name": "Luke Skywalker"}}),
    );
}

#[tokio::test]
async fn test_query_unknown_human() {
    let doc = r#"{ human(id: "some invalid id") { name } }"#;

    assert_eq!(run(doc).await.unwrap(), json!({"human": null}));
}

#[tokio::test]
async fn test_query_friends_names() {
    let doc = r#"{ human(id: "1000") { friends { name } } }"#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"human": {
            "friends": [
                {"name": "Han Solo"},
                {"name": "Leia Organa"},
                {"name": "C-3PO"},
                {"name": "R2-D2"},
            ],
        }}),
    );
}

#[tokio::test]
async fn test_query_inline_fragments_droid() {
    let doc = r#"
        query InlineFragments {
            hero {
                name
                __typename

                ...on Droid {
                    primaryFunction
                }
            }
        }
    "#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"hero": {
            "__typename": "Droid",
            "name": "R2-D2",
            "primaryFunction": "Astromech",
        }}),
    );
}

#[tokio::test]
async fn test_query_inline_fragments_human() {
    let doc = r#"
        query InlineFragments {
            hero(episode: EMPIRE) {
                __typename
                name
                ...on Human {
                    homePlanet
                }
            }
        }
    "#;

    assert_eq!(
        run(doc).await.unwrap(),
        json!({"hero": {
            "__typename": "Human",
            "name": "Luke Skywalker",
            "homePlanet": "Tatooine",
        }}),
    );
}

#[tokio::test]
async fn test_object_typename() {
    let doc = r#"{ human(id: "1000") { __typename } }"#;

    assert_eq!(run(doc).await.unwrap(), json!({"human": {"__typename": "Human"}}));
}

#[tokio::test]
async fn test_resolver_error_is_reported() {
    let doc = r#"{ hero { name secretBackstory } }"#;

    let err = run(doc).await.unwrap_err();

    assert!(
        matches!(&err, ClientError::ExecutionFailed { messages } if messages == &["secretBackstory is secret."]),
        "{err}",
    );
}

#[tokio::test]
async fn test_missing_context_is_reported() {
    let err = client().execute(r#"{ hero { name } }"#).await.unwrap_err();

    assert!(
        matches!(&err, ClientError::ExecutionFailed { messages } if messages == &["Database is missing"]),
        "{err}",
    );
}

#[tokio::test]
async fn test_invalid_field_is_rejected() {
    let err = run(r#"{ hero { mass } }"#).await.unwrap_err();

    assert!(matches!(err, ClientError::ExecutionFailed { .. }), "{err}");
}

#[test]
fn hero_resolves_through_implementors() {
    let schema = starwars::schema();
    let luke = schema
        .declaration("Human")
        .unwrap()
        .instantiate(vec!["1000".into(), "Luke Skywalker".into()], [] as [(&str, Value); 0])
        .unwrap();

    assert_eq!(
        schema
            .resolve_type("Character", &luke.into(), &crate::Context::empty())
            .as_deref(),
        Some("Human"),
    );
}

#[test]
fn characters_store_values_under_attribute_names() {
    let schema = starwars::schema();
    let database = Database::new();
    let args = Arguments::default();
    let info = ResolveInfo::new("hero", "Query", &args, &schema);

    for (character, attname, expected) in [
        (database.get_human("1000"), "home_planet", "Tatooine"),
        (database.get_droid("2001"), "primary_function", "Astromech"),
    ] {
        let value = character.unwrap().to_value(&info).unwrap();
        let instance = value.as_instance().unwrap();

        assert_eq!(instance.get(attname), Some(&Value::from(expected)));
    }
}
