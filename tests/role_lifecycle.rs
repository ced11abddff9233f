//! Role lifecycle integration tests.
//!
//! These run against a provisioned Postgres with `db/schema.sql`
//! applied and `DATABASE_URL` exported:
//!
//! ```text
//! cargo test --test role_lifecycle -- --ignored
//! ```

use sqlx::PgPool;
use uuid::Uuid;

use mdt_admin::actions::role_actions::{AddMembersInput, CreateDepartmentInput, CreateRoleInput};
use mdt_admin::actions::{role_management_access, RoleActions};
use mdt_admin::auth::{ActionGuard, BuiltinRole, ServerContext};
use mdt_admin::database::{DatabaseConfig, DatabaseManager, MemberRepository, RoleRepository};
use mdt_admin::error::{ActionError, AdminError};

async fn test_pool() -> PgPool {
    let db = DatabaseManager::new(DatabaseConfig::default())
        .await
        .expect("DATABASE_URL must point at a provisioned test database");
    db.pool().clone()
}

/// Seed an organization with one user holding the given role, and
/// return the guard-produced context for that user.
async fn seed_server(pool: &PgPool, role: BuiltinRole) -> ServerContext {
    let slug = format!("it-{}", Uuid::new_v4());

    let organization_id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO "mdt".organizations (name, slug) VALUES ($1, $1) RETURNING id"#,
    )
    .bind(&slug)
    .fetch_one(pool)
    .await
    .unwrap();

    let user_id = seed_member(pool, organization_id, role).await;

    let members = MemberRepository::new(pool.clone());
    ActionGuard::new(&members)
        .authorize(&slug, user_id, &role_management_access())
        .await
        .unwrap()
}

async fn seed_member(pool: &PgPool, organization_id: Uuid, role: BuiltinRole) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query(r#"INSERT INTO "mdt".users (id, name, email) VALUES ($1, 'Test User', $2)"#)
        .bind(user_id)
        .bind(format!("{user_id}@example.test"))
        .execute(pool)
        .await
        .unwrap();

    sqlx::query(
        r#"INSERT INTO "mdt".members (organization_id, user_id, role) VALUES ($1, $2, $3)"#,
    )
    .bind(organization_id)
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await
    .unwrap();

    user_id
}

fn role_input(name: &str) -> CreateRoleInput {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "color": "#f97316",
        "permissions": { "MANAGE_CALLS": true, "VIEW_DISPATCH": true }
    }))
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn role_positions_increment_from_zero() {
    let pool = test_pool().await;
    let ctx = seed_server(&pool, BuiltinRole::Owner).await;
    let actions = RoleActions::new(pool.clone());

    let first = actions.create_role(&ctx, role_input("Dispatch")).await.unwrap();
    assert_eq!(first.position, 0);

    let second = actions.create_role(&ctx, role_input("Patrol")).await.unwrap();
    assert_eq!(second.position, 1);

    let third = actions.create_role(&ctx, role_input("EMS")).await.unwrap();
    assert_eq!(third.position, 2);
}

#[tokio::test]
#[ignore]
async fn deleting_department_nulls_role_references_and_keeps_roles() {
    let pool = test_pool().await;
    let ctx = seed_server(&pool, BuiltinRole::Admin).await;
    let actions = RoleActions::new(pool.clone());
    let repository = RoleRepository::new(pool.clone());

    let department = actions
        .create_department(&ctx, CreateDepartmentInput { name: "LSPD".to_string() })
        .await
        .unwrap();

    let mut role_ids = Vec::new();
    for name in ["Dispatch", "Patrol", "Detective"] {
        let role = actions.create_role(&ctx, role_input(name)).await.unwrap();
        sqlx::query(r#"UPDATE "mdt".custom_roles SET department_id = $2 WHERE id = $1"#)
            .bind(role.id)
            .bind(department.id)
            .execute(&pool)
            .await
            .unwrap();
        role_ids.push(role.id);
    }

    let cleared = actions.delete_department(&ctx, department.id).await.unwrap();
    assert_eq!(cleared, 3);

    for role_id in role_ids {
        let role = repository
            .find_role(ctx.organization_id, role_id)
            .await
            .unwrap()
            .expect("role must survive department deletion");
        assert_eq!(role.department_id, None);
    }
}

#[tokio::test]
#[ignore]
async fn deleting_role_clears_member_assignments() {
    let pool = test_pool().await;
    let ctx = seed_server(&pool, BuiltinRole::Owner).await;
    let actions = RoleActions::new(pool.clone());
    let members = MemberRepository::new(pool.clone());

    let role = actions.create_role(&ctx, role_input("Dispatch")).await.unwrap();

    let mut user_ids = Vec::new();
    for _ in 0..3 {
        user_ids.push(seed_member(&pool, ctx.organization_id, BuiltinRole::Member).await);
    }

    let report = actions
        .add_members_to_role(
            &ctx,
            AddMembersInput { role_id: role.id, member_user_ids: user_ids.clone() },
        )
        .await
        .unwrap();
    assert_eq!(report.count, 3);

    let cleared = actions.delete_role(&ctx, role.id).await.unwrap();
    assert_eq!(cleared, 3);

    for user_id in user_ids {
        let membership = members
            .find_membership(ctx.organization_id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.custom_role_id, None);
    }
}

#[tokio::test]
#[ignore]
async fn bulk_assignment_rejects_members_outside_the_server() {
    let pool = test_pool().await;
    let ctx = seed_server(&pool, BuiltinRole::Admin).await;
    let actions = RoleActions::new(pool.clone());

    let role = actions.create_role(&ctx, role_input("Dispatch")).await.unwrap();
    let inside = seed_member(&pool, ctx.organization_id, BuiltinRole::Member).await;

    let err = actions
        .add_members_to_role(
            &ctx,
            AddMembersInput {
                role_id: role.id,
                member_user_ids: vec![inside, Uuid::new_v4()],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdminError::Action(ActionError::MembersOutsideServer)
    ));
}

#[tokio::test]
#[ignore]
async fn cross_organization_role_access_reads_as_not_found() {
    let pool = test_pool().await;
    let ctx_a = seed_server(&pool, BuiltinRole::Owner).await;
    let ctx_b = seed_server(&pool, BuiltinRole::Owner).await;
    let actions = RoleActions::new(pool.clone());

    let foreign = actions.create_role(&ctx_b, role_input("Dispatch")).await.unwrap();

    let err = actions.delete_role(&ctx_a, foreign.id).await.unwrap_err();
    assert!(matches!(err, AdminError::Action(ActionError::RoleNotFound)));
}

#[tokio::test]
#[ignore]
async fn plain_member_cannot_pass_the_role_management_guard() {
    let pool = test_pool().await;
    let ctx = seed_server(&pool, BuiltinRole::Owner).await;
    let member_user = seed_member(&pool, ctx.organization_id, BuiltinRole::Member).await;

    let members = MemberRepository::new(pool.clone());
    let err = ActionGuard::new(&members)
        .authorize(&ctx.slug, member_user, &role_management_access())
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Action(ActionError::Unauthorized)));
}
