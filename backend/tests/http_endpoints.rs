//! HTTP endpoint behaviour over the in-process stack: session enforcement,
//! ledger writes, leaderboard reads, badge administration, and referrals.

mod support;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test, web};
use serde_json::{Value, json};

use backend::domain::{Actor, Error, UserId};
use backend::inbound::http::badges::{create_badge, delete_badge, list_catalog, update_badge};
use backend::inbound::http::leaderboard::get_leaderboard;
use backend::inbound::http::ledger::record_chip_event;
use backend::inbound::http::referrals::{attribute_referral, complete_referral};
use backend::inbound::http::session::SessionContext;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{get_balance, get_rank};

use support::{balance_badge, http_state, stack, stack_with_badges};

async fn test_login(
    session: SessionContext,
    actor: web::Json<Actor>,
) -> Result<HttpResponse, Error> {
    session.persist_actor(&actor)?;
    Ok(HttpResponse::Ok().finish())
}

fn app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();

    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(session)
            .route("/test-login", web::post().to(test_login))
            .service(record_chip_event)
            .service(get_balance)
            .service(get_rank)
            .service(get_leaderboard)
            .service(list_catalog)
            .service(create_badge)
            .service(update_badge)
            .service(delete_badge)
            .service(attribute_referral)
            .service(complete_referral),
    )
}

async fn login_as<S, B>(service: &S, actor: &Actor) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let res = test::call_service(
        service,
        test::TestRequest::post()
            .uri("/api/v1/test-login")
            .set_json(actor)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .next()
        .expect("session cookie")
        .into_owned()
}

fn ledger_body(user: &UserId, amount: i64, reason: &str, source_ref: &str) -> Value {
    json!({
        "userId": user.to_string(),
        "amount": amount,
        "reason": reason,
        "sourceRef": source_ref,
    })
}

#[actix_web::test]
async fn ledger_writes_require_a_session() {
    let service = test::init_service(app(http_state(&stack()))).await;

    let res = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/ledger/entries")
            .set_json(ledger_body(
                &UserId::random(),
                100,
                "profile_completion",
                "profile",
            ))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn member_records_their_own_event_and_reads_balance() {
    let service = test::init_service(app(http_state(&stack()))).await;
    let user = UserId::random();
    let cookie = login_as(&service, &Actor::member(user.clone())).await;

    let recorded: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/ledger/entries")
            .cookie(cookie.clone())
            .set_json(ledger_body(&user, 100, "profile_completion", "profile"))
            .to_request(),
    )
    .await;

    assert_eq!(recorded["balance"], 100);
    assert_eq!(recorded["duplicate"], false);
    assert_eq!(recorded["tier"], "bronze");

    let balance: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{user}/balance"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(balance["balance"], 100);
}

#[actix_web::test]
async fn retried_write_reports_duplicate_over_http() {
    let fixture = stack_with_badges(vec![balance_badge("Profile Master", 100, 50)]);
    let service = test::init_service(app(http_state(&fixture))).await;
    let user = UserId::random();
    let cookie = login_as(&service, &Actor::member(user.clone())).await;

    let body = ledger_body(&user, 100, "profile_completion", "profile");
    let first: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/ledger/entries")
            .cookie(cookie.clone())
            .set_json(&body)
            .to_request(),
    )
    .await;
    let retry: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/ledger/entries")
            .cookie(cookie)
            .set_json(&body)
            .to_request(),
    )
    .await;

    assert_eq!(first["balance"], 150);
    assert_eq!(
        first["newlyUnlockedBadges"]
            .as_array()
            .map(Vec::len),
        Some(1)
    );
    assert_eq!(retry["duplicate"], true);
    assert_eq!(retry["balance"], 150);
    assert_eq!(retry["entryId"], first["entryId"]);
}

#[actix_web::test]
async fn unknown_reasons_are_rejected_with_details() {
    let service = test::init_service(app(http_state(&stack()))).await;
    let user = UserId::random();
    let cookie = login_as(&service, &Actor::member(user.clone())).await;

    let res = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/ledger/entries")
            .cookie(cookie)
            .set_json(ledger_body(&user, 100, "bribery", "prompt-1"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_enum_value");
    assert_eq!(body["details"]["field"], "reason");
}

#[actix_web::test]
async fn leaderboard_and_rank_agree_with_dense_ties() {
    let service = test::init_service(app(http_state(&stack()))).await;
    let admin = Actor::admin(UserId::random());
    let cookie = login_as(&service, &admin).await;

    let top = UserId::random();
    let tied_a = UserId::random();
    let tied_b = UserId::random();
    let last = UserId::random();
    for (user, amount) in [(&top, 300), (&tied_a, 200), (&tied_b, 200), (&last, 100)] {
        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/ledger/entries")
                .cookie(cookie.clone())
                .set_json(ledger_body(user, amount, "event_reward", "seed"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let page: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/api/v1/leaderboard?limit=10")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;

    let ranks: Vec<i64> = page["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["rank"].as_i64().expect("rank"))
        .collect();
    assert_eq!(ranks, vec![1, 2, 2, 3]);
    assert_eq!(page["total"], 4);

    let rank: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{last}/rank"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(rank["rank"], 3);
}

#[actix_web::test]
async fn badge_catalog_is_admin_writable_and_member_readable() {
    let service = test::init_service(app(http_state(&stack()))).await;
    let admin_cookie = login_as(&service, &Actor::admin(UserId::random())).await;
    let member_cookie = login_as(&service, &Actor::member(UserId::random())).await;

    let fields = json!({
        "name": "Connector",
        "description": "Refer six friends",
        "icon": "people",
        "chipsReward": 25,
        "unlockRule": { "kind": "referral_count_at_least", "threshold": 6 },
    });

    let denied = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/badges/catalog")
            .cookie(member_cookie.clone())
            .set_json(&fields)
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let created = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/badges/catalog")
            .cookie(admin_cookie.clone())
            .set_json(&fields)
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created_body: Value = test::read_body_json(created).await;
    let badge_id = created_body["badgeId"].as_str().expect("badge id").to_owned();

    let listed: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri("/api/v1/badges/catalog")
            .cookie(member_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let deleted = test::call_service(
        &service,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/badges/catalog/{badge_id}"))
            .cookie(admin_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = test::call_service(
        &service,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/badges/catalog/{badge_id}"))
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn referral_flow_credits_once_over_http() {
    let service = test::init_service(app(http_state(&stack()))).await;
    let referrer = UserId::random();
    let referee = UserId::random();
    let referrer_cookie = login_as(&service, &Actor::member(referrer.clone())).await;
    let admin_cookie = login_as(&service, &Actor::admin(UserId::random())).await;

    let attributed: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/referrals")
            .cookie(referrer_cookie.clone())
            .set_json(json!({ "refereeId": referee.to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(attributed["alreadyAttributed"], false);
    assert_eq!(attributed["referrerId"], referrer.to_string());

    // A member cannot trigger the qualifying-action credit.
    let member_complete = test::call_service(
        &service,
        test::TestRequest::post()
            .uri(&format!("/api/v1/referrals/{referee}/complete"))
            .cookie(referrer_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(member_complete.status(), StatusCode::FORBIDDEN);

    let completed: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&format!("/api/v1/referrals/{referee}/complete"))
            .cookie(admin_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(completed["credited"], true);

    let repeated: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::post()
            .uri(&format!("/api/v1/referrals/{referee}/complete"))
            .cookie(admin_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(repeated["credited"], false);

    let balance: Value = test::call_and_read_body_json(
        &service,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{referrer}/balance"))
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(balance["balance"], 100);
}

#[actix_web::test]
async fn self_referral_is_rejected() {
    let service = test::init_service(app(http_state(&stack()))).await;
    let user = UserId::random();
    let cookie = login_as(&service, &Actor::member(user.clone())).await;

    let res = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/referrals")
            .cookie(cookie)
            .set_json(json!({ "refereeId": user.to_string() }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
