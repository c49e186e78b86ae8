//! Cascade cleanup of dangling references on delete.
//!
//! Deleting a record must remove its id from every record on every list
//! that referenced it: two-way edges, one-way edges declared on other
//! lists, and self-referential edges. No dangling reference may persist
//! past the deleting mutation.

use asupersync::runtime::RuntimeBuilder;
use listmodel::prelude::*;
use std::future::Future;
use std::sync::Arc;

fn schema() -> Arc<SchemaRegistry> {
    let registry = SchemaBuilder::new()
        .list(
            ListDescriptor::new("User")
                .field(FieldDescriptor::text("name"))
                .field(FieldDescriptor::relationship(
                    "groups",
                    RelationshipDef::to("Group").counterpart("members").many(true),
                ))
                .field(FieldDescriptor::relationship(
                    "friends",
                    RelationshipDef::to("User").counterpart("friends").many(true),
                )),
        )
        .list(
            ListDescriptor::new("Group")
                .field(FieldDescriptor::text("name"))
                .field(FieldDescriptor::relationship(
                    "members",
                    RelationshipDef::to("User").counterpart("groups").many(true),
                )),
        )
        .list(
            // Audit rows reference users one-way; the user side declares
            // nothing, so only a schema-wide edge scan can find these.
            ListDescriptor::new("AuditEntry")
                .field(FieldDescriptor::text("action"))
                .field(FieldDescriptor::relationship(
                    "actor",
                    RelationshipDef::to("User"),
                )),
        )
        .build()
        .expect("schema builds");
    Arc::new(registry)
}

fn engine() -> Engine<MemoryStore> {
    let mut engine = Engine::new(schema());
    for list in ["User", "Group", "AuditEntry"] {
        engine
            .register_store(list, MemoryStore::new(list))
            .expect("store registered");
    }
    engine
}

fn run<F>(f: F)
where
    F: Future<Output = ()>,
{
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    rt.block_on(f);
}

fn ok<T>(outcome: Outcome<T, Error>) -> T {
    match outcome {
        Outcome::Ok(value) => value,
        Outcome::Err(e) => panic!("unexpected error: {e}"),
        _ => panic!("unexpected cancellation"),
    }
}

async fn find(engine: &Engine<MemoryStore>, cx: &Cx, list: &str, id: &RecordId) -> Record {
    ok(engine
        .store(list)
        .expect("store registered")
        .find_by_id(cx, id)
        .await)
    .expect("record exists")
}

#[test]
fn delete_strips_many_to_many_references_on_both_sides() {
    let engine = engine();
    let cx = Cx::for_testing();

    run(async {
        let group1 = ok(engine.create(&cx, "Group", &MutationData::new()).await);
        let group2 = ok(engine.create(&cx, "Group", &MutationData::new()).await);
        let join_both = || {
            MutationData::new().relationship(
                "groups",
                RelationshipInput::new()
                    .connect(group1.id.clone())
                    .connect(group2.id.clone()),
            )
        };
        let user1 = ok(engine.create(&cx, "User", &join_both()).await);
        let user2 = ok(engine.create(&cx, "User", &join_both()).await);

        ok(engine.delete(&cx, "User", &user1.id).await);

        let group1 = find(&engine, &cx, "Group", &group1.id).await;
        let group2 = find(&engine, &cx, "Group", &group2.id).await;
        assert_eq!(group1.references("members"), &[user2.id.clone()]);
        assert_eq!(group2.references("members"), &[user2.id.clone()]);

        let user2 = find(&engine, &cx, "User", &user2.id).await;
        assert_eq!(
            user2.references("groups"),
            &[group1.id.clone(), group2.id.clone()]
        );
    });
}

#[test]
fn delete_strips_one_way_references_from_other_lists() {
    let engine = engine();
    let cx = Cx::for_testing();

    run(async {
        let user = ok(engine.create(&cx, "User", &MutationData::new()).await);
        let survivor = ok(engine.create(&cx, "User", &MutationData::new()).await);
        let entry1 = ok(engine
            .create(
                &cx,
                "AuditEntry",
                &MutationData::new().set("action", "login").relationship(
                    "actor",
                    RelationshipInput::new().connect(user.id.clone()),
                ),
            )
            .await);
        let entry2 = ok(engine
            .create(
                &cx,
                "AuditEntry",
                &MutationData::new().set("action", "login").relationship(
                    "actor",
                    RelationshipInput::new().connect(survivor.id.clone()),
                ),
            )
            .await);

        ok(engine.delete(&cx, "User", &user.id).await);

        // the one-way reference to the deleted user is gone
        let entry1 = find(&engine, &cx, "AuditEntry", &entry1.id).await;
        assert!(entry1.references("actor").is_empty());
        // references to other users are untouched
        let entry2 = find(&engine, &cx, "AuditEntry", &entry2.id).await;
        assert_eq!(entry2.references("actor"), &[survivor.id.clone()]);
    });
}

#[test]
fn delete_strips_self_referential_edges() {
    let engine = engine();
    let cx = Cx::for_testing();

    run(async {
        let alice = ok(engine.create(&cx, "User", &MutationData::new()).await);
        let bob = ok(engine
            .create(
                &cx,
                "User",
                &MutationData::new().relationship(
                    "friends",
                    RelationshipInput::new().connect(alice.id.clone()),
                ),
            )
            .await);

        // the symmetric edge mirrored onto alice
        let alice_rec = find(&engine, &cx, "User", &alice.id).await;
        assert_eq!(alice_rec.references("friends"), &[bob.id.clone()]);

        ok(engine.delete(&cx, "User", &bob.id).await);

        let alice_rec = find(&engine, &cx, "User", &alice.id).await;
        assert!(alice_rec.references("friends").is_empty());
    });
}

#[test]
fn symmetry_holds_after_a_mixed_mutation_sequence() {
    let engine = engine();
    let cx = Cx::for_testing();

    run(async {
        let group = ok(engine.create(&cx, "Group", &MutationData::new()).await);
        let user1 = ok(engine
            .create(
                &cx,
                "User",
                &MutationData::new().relationship(
                    "groups",
                    RelationshipInput::new().connect(group.id.clone()),
                ),
            )
            .await);
        let user2 = ok(engine
            .create(
                &cx,
                "User",
                &MutationData::new().relationship(
                    "groups",
                    RelationshipInput::new().connect(group.id.clone()),
                ),
            )
            .await);

        // disconnect one side, reconnect through the other list's field
        ok(engine
            .update(
                &cx,
                "User",
                &user1.id,
                &MutationData::new()
                    .relationship("groups", RelationshipInput::new().disconnect(group.id.clone())),
            )
            .await);
        ok(engine
            .update(
                &cx,
                "Group",
                &group.id,
                &MutationData::new().relationship(
                    "members",
                    RelationshipInput::new().connect(user1.id.clone()),
                ),
            )
            .await);

        // A's field lists B iff B's counterpart field lists A, for every pair
        let group_rec = find(&engine, &cx, "Group", &group.id).await;
        for user_id in [&user1.id, &user2.id] {
            let user_rec = find(&engine, &cx, "User", user_id).await;
            assert_eq!(
                user_rec.references("groups").contains(&group.id),
                group_rec.references("members").contains(user_id),
                "symmetry broken for user {user_id}"
            );
        }
        // reconnect appended user1 after user2
        assert_eq!(
            group_rec.references("members"),
            &[user2.id.clone(), user1.id.clone()]
        );
    });
}
