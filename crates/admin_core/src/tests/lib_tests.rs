use store::MemoryStore;

use super::*;

fn testimonial(name: &str, display_order: u32) -> Testimonial {
    Testimonial {
        id: TestimonialId::generate(),
        client_name: name.to_string(),
        company: Some("Acme".into()),
        role: None,
        content: format!("{name} was delighted"),
        rating: 5,
        image_url: None,
        is_published: true,
        display_order,
    }
}

async fn seeded_session(
    rows: Vec<Testimonial>,
) -> (AdminSession<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.seed_testimonials(rows).await;
    let mut session = AdminSession::new(Arc::clone(&store));
    session.load_testimonials().await;
    (session, store)
}

fn session_names(session: &AdminSession<MemoryStore>) -> Vec<String> {
    session
        .testimonials()
        .iter()
        .map(|row| row.client_name.clone())
        .collect()
}

#[tokio::test]
async fn reorder_persists_a_dense_sequence_to_the_store() {
    let rows = vec![
        testimonial("alice", 0),
        testimonial("bob", 1),
        testimonial("carol", 2),
    ];
    let carol = rows[2].id;
    let alice = rows[0].id;
    let (mut session, store) = seeded_session(rows).await;

    let writes = session.move_testimonial(carol, alice).expect("move");
    assert_eq!(session_names(&session), vec!["carol", "alice", "bob"]);

    for write in writes {
        write.task.await.expect("join").expect("write");
    }

    let persisted = store.list_testimonials().await.expect("list");
    let names: Vec<&str> = persisted.iter().map(|row| row.client_name.as_str()).collect();
    assert_eq!(names, vec!["carol", "alice", "bob"]);
    let orders: Vec<u32> = persisted.iter().map(|row| row.display_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn failed_order_writes_keep_the_optimistic_order() {
    let rows = vec![testimonial("alice", 0), testimonial("bob", 1)];
    let alice = rows[0].id;
    let bob = rows[1].id;
    let (mut session, store) = seeded_session(rows).await;
    store.fail_writes(true);

    let writes = session.move_testimonial(bob, alice).expect("move");
    assert_eq!(session_names(&session), vec!["bob", "alice"]);

    for write in writes {
        let result = write.task.await.expect("join");
        assert!(matches!(result, Err(StoreError::Write(_))));
    }

    // UI keeps the new order; the store kept the old one. Drift is repaired
    // by the next load.
    assert_eq!(session_names(&session), vec!["bob", "alice"]);
    let persisted = store.testimonial_rows().await;
    assert_eq!(persisted[0].client_name, "alice");
    assert_eq!(persisted[0].display_order, 0);

    store.fail_writes(false);
    session.load_testimonials().await;
    assert_eq!(session_names(&session), vec!["alice", "bob"]);
}

#[tokio::test]
async fn self_drop_dispatches_no_writes() {
    let rows = vec![testimonial("alice", 0), testimonial("bob", 1)];
    let alice = rows[0].id;
    let (mut session, _store) = seeded_session(rows).await;

    let writes = session.move_testimonial(alice, alice).expect("move");
    assert!(writes.is_empty());
    assert_eq!(session_names(&session), vec!["alice", "bob"]);
}

#[tokio::test]
async fn moving_an_unknown_id_is_rejected_and_dispatches_nothing() {
    let rows = vec![testimonial("alice", 0)];
    let alice = rows[0].id;
    let (mut session, store) = seeded_session(rows).await;

    let err = session
        .move_testimonial(TestimonialId::generate(), alice)
        .expect_err("should reject");
    assert!(matches!(err, OrderingError::UnknownId(_)));
    assert_eq!(store.testimonial_rows().await.len(), 1);
}

#[tokio::test]
async fn delete_removes_locally_and_remotely_preserving_survivor_order() {
    let rows = vec![
        testimonial("alice", 0),
        testimonial("bob", 1),
        testimonial("carol", 2),
    ];
    let bob = rows[1].id;
    let (mut session, store) = seeded_session(rows).await;

    session
        .delete_testimonial(bob)
        .await
        .expect("join")
        .expect("delete");

    assert_eq!(session_names(&session), vec!["alice", "carol"]);
    let persisted = store.list_testimonials().await.expect("list");
    let names: Vec<&str> = persisted.iter().map(|row| row.client_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "carol"]);
    // No renumbering pass: carol keeps her gap.
    assert_eq!(persisted[1].display_order, 2);
}

#[tokio::test]
async fn create_appends_at_the_remote_count() {
    let (mut session, store) =
        seeded_session(vec![testimonial("alice", 0), testimonial("bob", 1)]).await;

    let id = session
        .create_testimonial(NewTestimonial {
            client_name: "carol".into(),
            content: "great work".into(),
            rating: 4,
            is_published: true,
            ..NewTestimonial::default()
        })
        .await
        .expect("create");

    let created = session
        .testimonials()
        .iter()
        .find(|row| row.id == id)
        .expect("created row");
    assert_eq!(created.display_order, 2);
    assert_eq!(store.testimonial_rows().await.len(), 3);
}

#[tokio::test]
async fn create_falls_back_to_the_local_count_when_the_remote_count_fails() {
    let (mut session, store) = seeded_session(vec![testimonial("alice", 0)]).await;
    store.fail_reads(true);

    let id = session
        .create_testimonial(NewTestimonial {
            client_name: "bob".into(),
            content: "solid".into(),
            rating: 5,
            is_published: false,
            ..NewTestimonial::default()
        })
        .await
        .expect("create");

    let created = session
        .testimonials()
        .iter()
        .find(|row| row.id == id)
        .expect("created row");
    assert_eq!(created.display_order, 1);
}

#[tokio::test]
async fn load_failure_surfaces_an_empty_list() {
    let (mut session, store) = seeded_session(vec![testimonial("alice", 0)]).await;
    store.fail_reads(true);

    let rows = session.load_testimonials().await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn contact_status_updates_optimistically_and_remotely() {
    let store = Arc::new(MemoryStore::new());
    let submission = ContactSubmission {
        id: ContactId::generate(),
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: "grace@example.test".into(),
        phone: None,
        message: "quote please".into(),
        status: ContactStatus::New,
        created_at: Utc::now(),
    };
    store
        .seed_contact_submissions(vec![submission.clone()])
        .await;
    let mut session = AdminSession::new(Arc::clone(&store));
    session.load_contacts().await;

    let task = session.set_contact_status(submission.id, ContactStatus::Read);
    assert_eq!(session.contacts()[0].status, ContactStatus::Read);

    task.await.expect("join").expect("patch");
    let persisted = store.list_contact_submissions().await.expect("list");
    assert_eq!(persisted[0].status, ContactStatus::Read);
}

#[tokio::test]
async fn submitted_contacts_start_out_new() {
    let store = Arc::new(MemoryStore::new());
    let session = AdminSession::new(Arc::clone(&store));

    session
        .submit_contact(ContactForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.test".into(),
            phone: Some("555-0100".into()),
            message: "hello".into(),
        })
        .await
        .expect("submit");

    let rows = store.list_contact_submissions().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ContactStatus::New);
}

#[tokio::test]
async fn dashboard_counts_cover_all_four_collections() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed_testimonials(vec![testimonial("alice", 0), testimonial("bob", 1)])
        .await;
    let session = AdminSession::new(Arc::clone(&store));

    let counts = session.dashboard_counts().await.expect("counts");
    assert_eq!(
        counts,
        DashboardCounts {
            contact_submissions: 0,
            testimonials: 2,
            portfolio_items: 0,
            case_studies: 0,
        }
    );
}

#[tokio::test]
async fn uploaded_images_land_under_the_collection_prefix() {
    let store = Arc::new(MemoryStore::new());
    let session = AdminSession::new(Arc::clone(&store));

    let url = session
        .upload_image("testimonials", "png", vec![1, 2, 3], "image/png")
        .await
        .expect("upload");

    assert!(url.starts_with("memory://images/testimonials/"));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
async fn created_portfolio_items_get_parsed_tags_and_show_up_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let mut session = AdminSession::new(Arc::clone(&store));
    session.load_portfolio().await;

    let id = session
        .create_portfolio_item(NewPortfolioItem {
            title: "CNC enclosure".into(),
            slug: "cnc-enclosure".into(),
            tags: "CAD, 3D Printing".into(),
            is_published: false,
            ..NewPortfolioItem::default()
        })
        .await
        .expect("create");

    assert_eq!(session.portfolio_items()[0].id, id);
    assert_eq!(
        session.portfolio_items()[0].tags,
        vec!["CAD", "3D Printing"]
    );
    let persisted = store.list_portfolio_items(false).await.expect("list");
    assert_eq!(persisted.len(), 1);
    assert!(!persisted[0].is_published);
}

#[tokio::test]
async fn portfolio_edits_replace_the_local_copy_after_the_remote_write() {
    let store = Arc::new(MemoryStore::new());
    let mut session = AdminSession::new(Arc::clone(&store));
    let id = session
        .create_portfolio_item(NewPortfolioItem {
            title: "Draft".into(),
            slug: "draft".into(),
            ..NewPortfolioItem::default()
        })
        .await
        .expect("create");

    let mut edited = session.portfolio_items()[0].clone();
    edited.title = "Published".into();
    edited.is_published = true;
    session.update_portfolio_item(edited).await.expect("update");

    assert_eq!(session.portfolio_items()[0].title, "Published");
    let persisted = store.list_portfolio_items(true).await.expect("list");
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, id);
}

#[tokio::test]
async fn case_study_lifecycle_roundtrips_through_the_store() {
    let store = Arc::new(MemoryStore::new());
    let mut session = AdminSession::new(Arc::clone(&store));

    let id = session
        .create_case_study(NewCaseStudy {
            title: "Factory retrofit".into(),
            slug: "factory-retrofit".into(),
            industry: Some("Manufacturing".into()),
            ..NewCaseStudy::default()
        })
        .await
        .expect("create");

    let mut edited = session.case_studies()[0].clone();
    edited.is_published = true;
    session.update_case_study(edited).await.expect("update");
    assert!(session.case_studies()[0].is_published);

    session
        .delete_case_study(id)
        .await
        .expect("join")
        .expect("delete");
    assert!(session.case_studies().is_empty());
    assert_eq!(store.list_case_studies().await.expect("list").len(), 0);
}

#[test]
fn tag_fields_split_on_commas_and_drop_blanks() {
    assert_eq!(
        parse_tags(" CAD, 3D Printing ,,  welding "),
        vec!["CAD", "3D Printing", "welding"]
    );
    assert!(parse_tags("").is_empty());
    assert!(parse_tags(" , ").is_empty());
}
