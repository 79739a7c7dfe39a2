#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use futures_util::future::join_all;
use serde_json::{json, Value};

use warden_core::access::{
    AccessResult, AccessRule, AuthenticationContext, FieldOperation, ListOperation, ResolverArgs,
};
use warden_core::error::ErrorCode;
use warden_core::policy::{FieldAccessCheck, ListAccessCheck};
use warden_engine::{config, AccessControl, ResolverRegistry};

const BLOG: &str = r#"
version: 1
schemas: [public, internal]
defaults:
  list: true
  field: true
lists:
  - key: Post
    access:
      public:
        create: !resolver is_signed_in
        read: { status: published }
        update: !resolver is_author
        delete: false
      internal: true
    fields:
      - key: title
      - key: views
        access: { create: false, update: false }
  - key: User
    access: !resolver is_signed_in
    fields:
      - key: password
        access:
          read: false
          update: !resolver is_self
"#;

fn registry() -> ResolverRegistry {
    let registry = ResolverRegistry::new();
    registry.register_fn("is_signed_in", |args: ResolverArgs| async move {
        Ok(json!(args.authentication.is_authenticated()))
    });
    registry.register_fn("is_author", |args: ResolverArgs| async move {
        Ok(match args.authentication.item.and_then(|i| i.get("id").cloned()) {
            Some(id) => json!({ "author": { "id": id } }),
            None => json!(false),
        })
    });
    registry.register_fn("is_self", |args: ResolverArgs| async move {
        let me = args.authentication.item.and_then(|i| i.get("id").cloned());
        let them = args.existing_item.and_then(|i| i.get("id").cloned());
        Ok(json!(me.is_some() && me == them))
    });
    registry
}

fn control() -> AccessControl {
    let cfg = config::load_from_str(BLOG).unwrap();
    AccessControl::new(&cfg, &registry()).unwrap()
}

#[test]
fn compiles_every_declaration() {
    let control = control();
    assert_eq!(control.list_keys(), vec!["Post", "User"]);
    assert_eq!(control.schema_names(), ["public".to_string(), "internal".to_string()]);

    let post = control.list_access("Post").unwrap();
    assert_eq!(post.get("internal", ListOperation::Delete), Some(&AccessRule::Boolean(true)));
    assert_eq!(post.get("public", ListOperation::Delete), Some(&AccessRule::Boolean(false)));

    let views = control.field_access("Post", "views").unwrap();
    assert_eq!(views.get("public", FieldOperation::Read), Some(&AccessRule::Boolean(true)));
    assert_eq!(views.get("internal", FieldOperation::Create), Some(&AccessRule::Boolean(false)));

    let title = control.field_access("Post", "title").unwrap();
    assert!(title.iter().all(|(_, _, r)| *r == AccessRule::Boolean(true)));
}

#[tokio::test]
async fn list_checks() {
    let control = control();
    let anon = AuthenticationContext::anonymous();
    let alice = AuthenticationContext::new("User", json!({ "id": "alice" }));

    let out = control
        .validate_list_access(ListAccessCheck::new("Post", "public", ListOperation::Create, &anon))
        .await
        .unwrap();
    assert!(out.is_denied());

    let out = control
        .validate_list_access(ListAccessCheck::new("Post", "public", ListOperation::Read, &anon))
        .await
        .unwrap();
    assert_eq!(
        out.filter().cloned().map(Value::from),
        Some(json!({ "status": "published" }))
    );

    let input = json!({ "title": "hello" });
    let out = control
        .validate_list_access(
            ListAccessCheck::new("Post", "public", ListOperation::Update, &alice)
                .with_original_input(&input),
        )
        .await
        .unwrap();
    assert_eq!(
        out.filter().cloned().map(Value::from),
        Some(json!({ "author": { "id": "alice" } }))
    );

    let out = control
        .validate_list_access(ListAccessCheck::new("User", "internal", ListOperation::Read, &alice))
        .await
        .unwrap();
    assert_eq!(out, AccessResult::Boolean(true));
}

#[tokio::test]
async fn field_checks() {
    let control = control();
    let alice = AuthenticationContext::new("User", json!({ "id": "alice" }));
    let alice_row = json!({ "id": "alice" });
    let bob_row = json!({ "id": "bob" });

    let read = control
        .validate_field_access(FieldAccessCheck::new(
            "User",
            "password",
            "public",
            FieldOperation::Read,
            &alice,
        ))
        .await
        .unwrap();
    assert!(!read);

    let own = control
        .validate_field_access(
            FieldAccessCheck::new("User", "password", "public", FieldOperation::Update, &alice)
                .with_existing_item(&alice_row),
        )
        .await
        .unwrap();
    assert!(own);

    let other = control
        .validate_field_access(
            FieldAccessCheck::new("User", "password", "public", FieldOperation::Update, &alice)
                .with_existing_item(&bob_row),
        )
        .await
        .unwrap();
    assert!(!other);
}

#[tokio::test]
async fn unknown_targets_are_runtime_faults() {
    let control = control();
    let anon = AuthenticationContext::anonymous();

    let err = control
        .validate_list_access(ListAccessCheck::new("Comment", "public", ListOperation::Read, &anon))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownList);

    let err = control
        .validate_field_access(FieldAccessCheck::new(
            "Post",
            "body",
            "public",
            FieldOperation::Read,
            &anon,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownField);
}

#[tokio::test]
async fn shared_handle_serves_concurrent_requests() {
    let control = control();
    let tasks = (0..32).map(|n| {
        let control = control.clone();
        tokio::spawn(async move {
            let auth = AuthenticationContext::new("User", json!({ "id": n }));
            let out = control
                .validate_list_access(ListAccessCheck::new(
                    "Post",
                    "public",
                    ListOperation::Update,
                    &auth,
                ))
                .await
                .unwrap();
            (n, out)
        })
    });

    for joined in join_all(tasks).await {
        let (n, out) = joined.unwrap();
        assert_eq!(
            out.filter().cloned().map(Value::from),
            Some(json!({ "author": { "id": n } }))
        );
    }
}

#[test]
fn configuration_faults_surface_at_compile_time() {
    let unknown_resolver = r#"
version: 1
lists:
  - key: Post
    access: { update: !resolver nobody }
"#;
    let cfg = config::load_from_str(unknown_resolver).unwrap();
    let err = AccessControl::new(&cfg, &registry()).err().expect("must fail");
    assert_eq!(err.code(), ErrorCode::UnknownResolver);

    let mixed = r#"
version: 1
schemas: [public, internal]
lists:
  - key: Post
    access: { public: true, read: false }
"#;
    let cfg = config::load_from_str(mixed).unwrap();
    let err = AccessControl::new(&cfg, &registry()).err().expect("must fail");
    assert_eq!(err.code(), ErrorCode::MixedSchemaNames);

    let field_filter = r#"
version: 1
lists:
  - key: Post
    fields:
      - key: title
        access: { read: { status: published } }
"#;
    let cfg = config::load_from_str(field_filter).unwrap();
    let err = AccessControl::new(&cfg, &registry()).err().expect("must fail");
    assert_eq!(err.mismatches()[0].code, ErrorCode::InvalidFieldAccessType);
    assert!(err.to_string().contains("Post.fields.title.access.read"));
}

fn compile_error(yaml: &str) -> warden_core::WardenError {
    let cfg = config::load_from_str(yaml).unwrap();
    AccessControl::new(&cfg, &registry()).err().expect("must fail")
}

#[test]
fn errors_name_the_offending_declaration() {
    let shorthand = r#"
version: 1
schemas: [public, internal]
lists:
  - key: Post
    access: true
  - key: Comment
    access: "yes"
  - key: User
    access: false
"#;
    let err = compile_error(shorthand);
    assert_eq!(err.code(), ErrorCode::InvalidShorthandType);
    assert!(err.to_string().contains("Comment.access"), "{err}");

    let mixed = r#"
version: 1
schemas: [public, internal]
lists:
  - key: Post
  - key: Comment
    access: { public: true, read: false }
"#;
    let err = compile_error(mixed);
    assert_eq!(err.code(), ErrorCode::MixedSchemaNames);
    assert!(err.to_string().contains("Comment.access"), "{err}");

    let field_filter = r#"
version: 1
lists:
  - key: Post
  - key: Comment
    fields:
      - key: body
        access: { status: published }
"#;
    let err = compile_error(field_filter);
    assert_eq!(err.code(), ErrorCode::GranularParse);
    assert!(err.to_string().contains("Comment.fields.body.access"), "{err}");

    let reserved = r#"
version: 1
schemas: [public, read]
lists:
  - key: Comment
"#;
    let err = compile_error(reserved);
    assert_eq!(err.code(), ErrorCode::ReservedSchemaNames);
    assert!(err.to_string().contains("Comment.access"), "{err}");
}

#[test]
fn explicit_null_access_is_rejected() {
    let list_null = r#"
version: 1
lists:
  - key: Post
  - key: Comment
    access: ~
"#;
    let err = compile_error(list_null);
    assert_eq!(err.code(), ErrorCode::InvalidShorthandType);
    let msg = err.to_string();
    assert!(msg.contains("Comment.access"), "{msg}");
    assert!(msg.contains("Null"), "{msg}");

    let field_null = r#"
version: 1
lists:
  - key: Comment
    fields:
      - key: body
        access: null
"#;
    let err = compile_error(field_null);
    assert_eq!(err.code(), ErrorCode::InvalidShorthandType);
    assert!(err.to_string().contains("Comment.fields.body.access"), "{err}");
}

#[test]
fn referenced_resolvers_are_collected() {
    let cfg = config::load_from_str(BLOG).unwrap();
    let names: Vec<String> = config::referenced_resolvers(&cfg).unwrap().into_iter().collect();
    assert_eq!(names, vec!["is_author", "is_self", "is_signed_in"]);
}
