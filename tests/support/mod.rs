//! In-memory stand-in for the backend, reached through `Transport` like the
//! real one. Behaves the way the live service is documented to, including
//! its known defects: a 500 on huge deposits, accepting `goalId = 0` for a
//! target language, and saving learning materials without checking language
//! ids or the picture's media type.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Mutex;

use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use fcle_contract::auth::AUTHORIZATION;
use fcle_contract::environment::HarnessConfig;
use fcle_contract::error::HarnessError;
use fcle_contract::http::negotiation::{ACCEPT, CONTENT_TYPE};
use fcle_contract::http::{HttpMethod, RequestInput, ResponseOutcome, Transport};
use fcle_contract::suites::current_year;

pub const BASE_URL: &str = "http://backend.test/api";

const KNOWN_TEACHERS: [i64; 2] = [1_000_155, 1_000_144];
const LEVELS: [&str; 7] = ["", "A1", "A2", "B1", "B2", "C1", "C2"];
const MAX_DEPOSIT: f64 = 1e9;
const MAX_DESCRIPTION: usize = 500;
const CREATED_AT: &str = "2024-05-01T10:00:00Z";
const PACKAGE_PRICE: f64 = 10.0;
const STARTER_PACKAGE: i64 = 1;
const MAX_TITLE: usize = 200;
const MAX_INSTITUTION: usize = 200;
const MAX_FIELD_OF_STUDY: usize = 100;
const MAX_ORGANIZATION: usize = 200;
const MAX_POSITION: usize = 100;
const DEGREES: std::ops::RangeInclusive<i64> = 1..=5;
const EDUCATION_NOT_FOUND: &str = "teacherEducation.TeacherEducation.notFound";

/// Collections addressed as `<collection>/<id>`.
const ITEM_COLLECTIONS: [&str; 5] = [
    "favoriteteachers",
    "Accounting/terminate-package",
    "LearningMaterials",
    "TeacherEducations",
    "TeacherDocuments",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("fcle_contract=debug"))
        .try_init();
}

pub fn config() -> HarnessConfig {
    HarnessConfig::default().with_base_url(BASE_URL)
}

/// Deliberate misbehaviour, for checking that the harness notices.
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    /// Added to every echoed deposit amount.
    pub deposit_echo_offset: f64,
    /// Balance responses leave out `balance`.
    pub balance_without_amount: bool,
    /// Favorite deletes answer 204 but keep the teacher.
    pub sticky_favorites: bool,
    /// The favorites list always carries this extra teacher.
    pub phantom_favorite: Option<i64>,
    /// Signup answers 500, so no session can be made.
    pub signup_down: bool,
    /// Terminating a well-formed package id answers 500.
    pub terminate_fails: bool,
}

#[derive(Debug, Default)]
struct State {
    serial: u64,
    /// signup token -> email
    pending: BTreeMap<String, String>,
    registered: BTreeSet<String>,
    passwords: BTreeMap<String, String>,
    /// bearer token -> email
    sessions: BTreeMap<String, String>,
    /// reset token -> email
    resets: BTreeMap<String, String>,
    user_ids: BTreeMap<String, i64>,
    nicknames: BTreeMap<String, String>,
    favorites: BTreeMap<String, Vec<i64>>,
    languages: BTreeMap<String, Vec<Value>>,
    ledger: BTreeMap<String, Vec<Value>>,
    packages: BTreeMap<String, Vec<Value>>,
    /// id -> (owner email, record)
    materials: BTreeMap<i64, (String, Value)>,
    educations: BTreeMap<i64, (String, Value)>,
    requests: Vec<(HttpMethod, String)>,
}

impl State {
    fn next_serial(&mut self) -> u64 {
        self.serial += 1;
        self.serial
    }

    fn next_id(&mut self) -> i64 {
        i64::try_from(self.next_serial()).unwrap_or(i64::MAX)
    }

    fn user_id(&mut self, email: &str) -> i64 {
        let next = i64::try_from(self.user_ids.len()).unwrap_or_default() + 1;
        *self.user_ids.entry(email.to_string()).or_insert(next)
    }
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    quirks: Quirks,
    state: Mutex<State>,
}

impl Transport for FakeBackend {
    fn send(&self, request: RequestInput) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        let outcome = self.handle(&request);
        async move { Ok(outcome) }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        Self {
            quirks,
            state: Mutex::default(),
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<(HttpMethod, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    fn handle(&self, request: &RequestInput) -> ResponseOutcome {
        let mut state = self.state.lock().unwrap();
        state.requests.push((request.method, request.url.clone()));

        let Some(path) = request.url.strip_prefix(BASE_URL) else {
            return not_found();
        };
        let path = path.trim_start_matches('/');
        if request.method == HttpMethod::Options {
            return allow("GET, POST, PUT, DELETE, OPTIONS");
        }
        let (route, item) = split_item(path);

        match (request.method, route, item) {
            (HttpMethod::Post, "auth/signup", None) => {
                if self.quirks.signup_down {
                    return reply(500, json!({}));
                }
                signup(&mut state, request)
            }
            (HttpMethod::Post, "auth/set-password", None) => set_password(&mut state, request),
            (HttpMethod::Post, "auth/login", None) => login(&mut state, request),
            (HttpMethod::Post, "auth/forgot-password", None) => forgot_password(&mut state, request),
            (HttpMethod::Post, "auth/reset-password", None) => reset_password(&mut state, request),
            (HttpMethod::Post, "auth/change-password", None) => {
                self.authorized(&mut state, request, true, |_, state, email, body| change_password(state, email, body))
            }
            (HttpMethod::Get, "Users/get-profile", None) => {
                self.authorized(&mut state, request, false, |_, state, email, _| profile(state, email))
            }
            (HttpMethod::Post, "Accounting/deposit", None) => {
                self.authorized(&mut state, request, true, |backend, state, email, body| {
                    backend.deposit(state, email, body)
                })
            }
            (HttpMethod::Post, "Accounting/buy-package", None) => {
                self.authorized(&mut state, request, true, |backend, state, email, body| {
                    backend.buy_package(state, email, body)
                })
            }
            (HttpMethod::Get, "Accounting/user-account-balance", None) => {
                self.authorized(&mut state, request, false, |backend, state, email, _| backend.balance(state, email))
            }
            (HttpMethod::Get, "Accounting/user-account-transactions", None) => {
                self.authorized(&mut state, request, false, |_, state, email, _| {
                    reply(200, Value::Array(state.ledger.get(email).cloned().unwrap_or_default()))
                })
            }
            (HttpMethod::Delete, "Accounting/terminate-package", Some(id)) => {
                self.authorized(&mut state, request, false, |backend, state, email, _| {
                    backend.terminate_package(state, email, id)
                })
            }
            (HttpMethod::Get, "favoriteteachers", None) => {
                self.authorized(&mut state, request, false, |backend, state, email, _| {
                    backend.list_favorites(state, email)
                })
            }
            (HttpMethod::Post, "favoriteteachers", None) => {
                self.authorized(&mut state, request, true, |_, state, email, body| add_favorite(state, email, body))
            }
            (HttpMethod::Delete, "favoriteteachers", Some(id)) => {
                self.authorized(&mut state, request, false, |backend, state, email, _| {
                    backend.delete_favorite(state, email, id)
                })
            }
            // This resource only answers on the trailing-slash spelling.
            (HttpMethod::Get, "UserLanguages/", None) => {
                self.authorized(&mut state, request, false, |_, state, email, _| {
                    reply(200, Value::Array(state.languages.get(email).cloned().unwrap_or_default()))
                })
            }
            (HttpMethod::Post, "UserLanguages/", None) => {
                self.authorized(&mut state, request, true, |_, state, email, body| save_language(state, email, body))
            }
            (HttpMethod::Post, "LearningMaterials", None) => {
                self.authorized(&mut state, request, true, |_, state, email, body| {
                    save_material(state, email, None, body)
                })
            }
            // Materials are public to read.
            (HttpMethod::Get, "LearningMaterials", Some(id)) => get_material(&state, id),
            (HttpMethod::Put, "LearningMaterials", Some(id)) => {
                self.authorized(&mut state, request, true, |_, state, email, body| {
                    save_material(state, email, Some(id), body)
                })
            }
            (HttpMethod::Delete, "LearningMaterials", Some(id)) => {
                self.authorized(&mut state, request, false, |_, state, email, _| delete_material(state, email, id))
            }
            (HttpMethod::Post, "TeacherEducations", None) => {
                self.authorized(&mut state, request, true, |_, state, email, body| {
                    save_education(state, email, None, body)
                })
            }
            (HttpMethod::Get, "TeacherEducations", Some(id)) => {
                self.authorized(&mut state, request, false, |_, state, email, _| get_education(state, email, id))
            }
            (HttpMethod::Put, "TeacherEducations", Some(id)) => {
                self.authorized(&mut state, request, true, |_, state, email, body| {
                    save_education(state, email, Some(id), body)
                })
            }
            // Uploads are multipart; a new user has no documents.
            (HttpMethod::Get, "TeacherDocuments", None) => {
                self.authorized(&mut state, request, false, |_, _, _, _| reply(200, json!([])))
            }
            (HttpMethod::Get, "TeacherDocuments", Some(id)) => {
                self.authorized(&mut state, request, false, |_, _, _, _| match parse_id(id) {
                    Ok(_) => reply(404, json!({"error": {"code": "teacherDocument.notFound"}})),
                    Err(outcome) => outcome,
                })
            }
            (HttpMethod::Post, "TeachingExperiences", None) => {
                self.authorized(&mut state, request, true, |_, state, email, body| {
                    save_experience(state, email, body)
                })
            }
            _ => not_found(),
        }
    }

    /// Bearer check, then Accept, then (for writes) Content-Type and body.
    fn authorized(
        &self,
        state: &mut State,
        request: &RequestInput,
        needs_body: bool,
        handler: impl FnOnce(&Self, &mut State, &str, &Map<String, Value>) -> ResponseOutcome,
    ) -> ResponseOutcome {
        let email = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| state.sessions.get(token))
            .cloned();
        let Some(email) = email else {
            return reply(401, json!({"error": {"code": "unauthorized", "message": "invalid or missing token"}}));
        };
        if refuses_accept(request) {
            return reply(406, json!({"error": {"code": "notAcceptable"}}));
        }
        let empty = Map::new();
        let body = if needs_body {
            match json_body(request) {
                Ok(body) => body,
                Err(outcome) => return outcome,
            }
        } else {
            &empty
        };
        handler(self, state, &email, body)
    }

    fn deposit(&self, state: &mut State, email: &str, body: &Map<String, Value>) -> ResponseOutcome {
        let amount = match body.get("amount") {
            None | Some(Value::Null) => return invalid("amount", "validation.failed", "amount is required"),
            Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
            Some(_) => return invalid("amount", "validation.failed", "amount must be a number"),
        };
        if amount < 0.0 {
            return invalid("amount", "amount.lessZero", "amount must not be negative");
        }
        if amount == 0.0 {
            return invalid("amount", "amount.notPositive", "amount must be positive");
        }
        let fee = match body.get("fee") {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
            Some(_) => return invalid("fee", "validation.failed", "fee must be a number"),
        };
        if fee < 0.0 {
            return invalid("fee", "fee.lessZero", "fee must not be negative");
        }
        let description = body.get("description").and_then(Value::as_str).unwrap_or_default();
        if description.len() > MAX_DESCRIPTION {
            return invalid("description", "description.tooLong", "description is too long");
        }
        if amount > MAX_DEPOSIT {
            return reply(500, json!({"error": {"code": "db.saveFailed", "message": "could not save transaction"}}));
        }

        let id = state.next_serial();
        state.ledger.entry(email.to_string()).or_default().push(json!({
            "transactionId": id,
            "debit": 0,
            "credit": amount,
            "createdAt": CREATED_AT,
            "currencyCode": "USD",
            "transaction": {
                "id": id,
                "amount": amount,
                "feeAmount": fee,
                "currency": "USD",
                "status": "completed",
                "transactionDate": CREATED_AT,
                "description": description,
            },
        }));
        reply(
            200,
            json!({
                "amount": amount + self.quirks.deposit_echo_offset,
                "feeAmount": fee,
                "currencyCode": "USD",
                "description": description,
            }),
        )
    }

    fn balance(&self, state: &State, email: &str) -> ResponseOutcome {
        if self.quirks.balance_without_amount {
            return reply(200, json!({"currencyCode": "USD"}));
        }
        reply(200, json!({"balance": format!("{:.2}", funds(state, email)), "currencyCode": "USD"}))
    }

    fn buy_package(&self, state: &mut State, email: &str, body: &Map<String, Value>) -> ResponseOutcome {
        const FIELD: &str = "lessonPackageDefinitionId";
        let id = match body.get(FIELD) {
            None | Some(Value::Null) => return invalid(FIELD, "validation.failed", "lessonPackageDefinitionId is required"),
            Some(Value::Number(number)) => number.as_i64(),
            Some(Value::String(text)) => match text.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => return invalid(FIELD, "validation.failed", "lessonPackageDefinitionId must be an integer"),
            },
            Some(_) => return invalid(FIELD, "validation.failed", "lessonPackageDefinitionId must be an integer"),
        };
        let id = match id {
            Some(id) if id > 0 && id <= i64::from(i32::MAX) => id,
            _ => return invalid(FIELD, "validation.outOfRange", "lessonPackageDefinitionId is out of range"),
        };
        if id != STARTER_PACKAGE {
            return reply(404, json!({"error": {"code": "lessonPackageDefinition.notFound"}}));
        }
        if funds(state, email) < PACKAGE_PRICE {
            return reply(
                422,
                json!({"error": {"code": "accounting.user.insufficientFunds", "message": "not enough funds"}}),
            );
        }

        let serial = state.next_id();
        let student_id = state.user_id(email);
        state.ledger.entry(email.to_string()).or_default().push(json!({
            "transactionId": serial,
            "debit": PACKAGE_PRICE,
            "credit": 0,
            "createdAt": CREATED_AT,
            "currencyCode": "USD",
            "transaction": {
                "id": serial,
                "amount": PACKAGE_PRICE,
                "feeAmount": 0,
                "currency": "USD",
                "status": "completed",
                "transactionDate": CREATED_AT,
                "description": "package purchase",
            },
        }));
        let packages = state.packages.entry(email.to_string()).or_default();
        let package = json!({
            "id": packages.len() + 1,
            "studentId": student_id,
            "teacherId": KNOWN_TEACHERS[0],
            "packageDefId": id,
            "title": "Starter package",
            "description": "Five lessons",
            "status": "active",
            "currencyCode": "USD",
            "price": PACKAGE_PRICE,
            "platformFee": 1.0,
            "lessonDuration": 60,
            "lessonsRemaining": 5,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "teacher": {"id": KNOWN_TEACHERS[0], "nickname": "teacher"},
        });
        packages.push(package.clone());
        reply(200, package)
    }

    fn terminate_package(&self, state: &mut State, email: &str, segment: &str) -> ResponseOutcome {
        let id = match parse_id(segment) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        if self.quirks.terminate_fails {
            return reply(500, json!({"error": {"code": "accounting.transactionMismatch"}}));
        }
        let package = state
            .packages
            .get_mut(email)
            .and_then(|packages| packages.iter_mut().find(|package| package["id"] == json!(id)));
        let Some(package) = package else {
            return reply(404, json!({"error": {"code": "lessonPackage.notFound"}}));
        };
        if package["status"] == json!("terminated") {
            return reply(410, json!({"error": {"code": "lessonPackage.terminated"}}));
        }
        package["status"] = json!("terminated");
        package["lessonsRemaining"] = json!(0);
        reply(200, package.clone())
    }

    fn list_favorites(&self, state: &State, email: &str) -> ResponseOutcome {
        let ids = state.favorites.get(email).into_iter().flatten().copied();
        let items: Vec<Value> = ids
            .chain(self.quirks.phantom_favorite)
            .map(|id| {
                json!({
                    "id": id,
                    "nickname": format!("teacher{id}"),
                    "language": {"id": 1, "languageName": "English", "languageOwnName": "English"},
                })
            })
            .collect();
        reply(200, Value::Array(items))
    }

    fn delete_favorite(&self, state: &mut State, email: &str, id: &str) -> ResponseOutcome {
        let favorites = state.favorites.entry(email.to_string()).or_default();
        let position = id.parse::<i64>().ok().and_then(|id| favorites.iter().position(|&known| known == id));
        match position {
            Some(position) => {
                if !self.quirks.sticky_favorites {
                    favorites.remove(position);
                }
                no_content()
            }
            None => reply(422, json!({"error": {"code": "notFound", "message": "teacher is not a favorite"}})),
        }
    }
}

fn signup(state: &mut State, request: &RequestInput) -> ResponseOutcome {
    let body = match json_body(request) {
        Ok(body) => body,
        Err(outcome) => return outcome,
    };
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default().to_string();
    if !is_valid_email(&email) {
        return invalid("email", "email.invalid", "email is invalid");
    }
    if state.registered.contains(&email) {
        return reply(429, json!({"error": {"code": "tooManyRequests", "message": "signup already requested"}}));
    }
    let lang = match body.get("lang") {
        Some(Value::String(lang)) => lang.clone(),
        _ => "en".to_string(),
    };
    let token = format!("signup-{}", state.next_serial());
    state.pending.insert(token.clone(), email.clone());
    state.registered.insert(email.clone());
    reply(200, json!({"email": email, "lang": lang, "token": token}))
}

fn set_password(state: &mut State, request: &RequestInput) -> ResponseOutcome {
    let body = match json_body(request) {
        Ok(body) => body,
        Err(outcome) => return outcome,
    };
    let token = body.get("token").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("newPassword").and_then(Value::as_str).unwrap_or_default().to_string();
    let nickname = body.get("nickname").and_then(Value::as_str).unwrap_or_default().to_string();
    match state.pending.remove(token) {
        Some(email) if !password.is_empty() => {
            state.nicknames.insert(email.clone(), nickname);
            state.passwords.insert(email, password);
            no_content()
        }
        _ => invalid("token", "token.invalid", "unknown signup token"),
    }
}

fn login(state: &mut State, request: &RequestInput) -> ResponseOutcome {
    let body = match json_body(request) {
        Ok(body) => body,
        Err(outcome) => return outcome,
    };
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default().to_string();
    let password = body.get("password").and_then(Value::as_str);
    if password.is_none() || state.passwords.get(&email).map(String::as_str) != password {
        return reply(401, json!({"error": {"code": "invalidCredentials"}}));
    }
    let token = format!("fake-session-token-{:06}", state.next_serial());
    state.sessions.insert(token.clone(), email);
    reply(200, json!({"token": token}))
}

fn forgot_password(state: &mut State, request: &RequestInput) -> ResponseOutcome {
    let body = match json_body(request) {
        Ok(body) => body,
        Err(outcome) => return outcome,
    };
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default().to_string();
    if !is_valid_email(&email) {
        return invalid("email", "email.invalid", "email is invalid");
    }
    if !state.passwords.contains_key(&email) {
        return reply(404, json!({"error": {"code": "user.notFound"}}));
    }
    let token = format!("reset-{}", state.next_serial());
    state.resets.insert(token.clone(), email);
    let headers = BTreeMap::from([("Content-Type".to_string(), "text/plain".to_string())]);
    ResponseOutcome::new(200, headers, token)
}

fn reset_password(state: &mut State, request: &RequestInput) -> ResponseOutcome {
    let body = match json_body(request) {
        Ok(body) => body,
        Err(outcome) => return outcome,
    };
    let token = body.get("token").and_then(Value::as_str).unwrap_or_default();
    if token.is_empty() {
        return invalid("token", "validation.failed", "token is required");
    }
    let password = body.get("newPassword").and_then(Value::as_str).unwrap_or_default();
    if password.is_empty() {
        return invalid("newPassword", "validation.failed", "newPassword is required");
    }
    let Some(email) = state.resets.remove(token) else {
        return reply(404, json!({"error": {"code": "resetToken.notFound"}}));
    };
    state.passwords.insert(email, password.to_string());
    reply(200, json!({"success": true}))
}

fn change_password(state: &mut State, email: &str, body: &Map<String, Value>) -> ResponseOutcome {
    let Some(old) = body.get("oldPassword").and_then(Value::as_str) else {
        return invalid("oldPassword", "validation.failed", "oldPassword is required");
    };
    let new = body.get("newPassword").and_then(Value::as_str).unwrap_or_default();
    if new.is_empty() {
        return invalid("newPassword", "validation.failed", "newPassword is required");
    }
    if state.passwords.get(email).map(String::as_str) != Some(old) {
        return reply(400, json!({"error": {"code": "password.mismatch", "message": "old password is wrong"}}));
    }
    state.passwords.insert(email.to_string(), new.to_string());
    reply(200, json!({"success": true}))
}

fn profile(state: &mut State, email: &str) -> ResponseOutcome {
    let id = state.user_id(email);
    reply(
        200,
        json!({
            "id": id,
            "email": email,
            "nickname": state.nicknames.get(email).cloned().unwrap_or_default(),
            "timezone": "UTC+4",
            "joinDate": CREATED_AT,
            "lastLogin": CREATED_AT,
            "hobbies": null,
            "interests": [],
            "userLanguages": state.languages.get(email).cloned().unwrap_or_default(),
        }),
    )
}

fn add_favorite(state: &mut State, email: &str, body: &Map<String, Value>) -> ResponseOutcome {
    let id = match body.get("teacherId") {
        None | Some(Value::Null) => return invalid("teacherId", "validation.failed", "teacherId is required"),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(id) if id > 0 && id <= i64::from(i32::MAX) => id,
            _ => return invalid("teacherId", "teacherId.outOfRange", "teacherId is out of range"),
        },
        Some(_) => return invalid("teacherId", "validation.failed", "teacherId must be an integer"),
    };
    if !KNOWN_TEACHERS.contains(&id) {
        return reply(404, json!({"error": {"code": "teacherNotFound"}}));
    }
    let favorites = state.favorites.entry(email.to_string()).or_default();
    if favorites.contains(&id) {
        return reply(422, json!({"error": {"code": "isExists", "message": "teacher is already a favorite"}}));
    }
    favorites.push(id);
    reply(200, json!({"teacherId": id}))
}

fn save_language(state: &mut State, email: &str, body: &Map<String, Value>) -> ResponseOutcome {
    let positive = |name: &str| body.get(name).and_then(Value::as_i64).filter(|&id| id > 0);
    let Some(language_id) = positive("languageId") else {
        return invalid("languageId", "validation.failed", "languageId must be positive");
    };
    let Some(is_target) = body.get("isTarget").and_then(Value::as_bool) else {
        return invalid("isTarget", "validation.failed", "isTarget must be a boolean");
    };
    let level = body.get("level").and_then(Value::as_str).unwrap_or("Z");
    if !LEVELS.contains(&level) {
        return invalid("level", "validation.failed", "level is unknown");
    }
    let Some(subgoal_id) = positive("subgoalId") else {
        return invalid("subgoalId", "validation.failed", "subgoalId must be positive");
    };
    let goal_id = body.get("goalId").and_then(Value::as_i64);

    let serial = state.next_serial();
    let records = state.languages.entry(email.to_string()).or_default();
    let existing = records
        .iter()
        .position(|record| record.get("languageId").and_then(Value::as_i64) == Some(language_id));
    let id = match existing {
        Some(position) => records[position].get("id").cloned().unwrap_or(Value::Null),
        None => json!(1000 + serial),
    };
    let record = json!({
        "id": id,
        "languageId": language_id,
        "isTarget": is_target,
        "level": level,
        "goalId": goal_id,
        "subgoalId": subgoal_id,
    });
    match existing {
        Some(position) => records[position] = record.clone(),
        None => records.push(record.clone()),
    }
    reply(200, record)
}

fn save_material(state: &mut State, email: &str, item: Option<&str>, body: &Map<String, Value>) -> ResponseOutcome {
    let id = match item.map(parse_id).transpose() {
        Ok(id) => id,
        Err(outcome) => return outcome,
    };
    if let Some(id) = id {
        match state.materials.get(&id) {
            None => return reply(404, json!({"error": {"code": "learningMaterial.notFound"}})),
            Some((owner, _)) if owner != email => return reply(403, json!({"error": {"code": "forbidden"}})),
            Some(_) => {}
        }
    }
    let title = body.get("title").and_then(Value::as_str).unwrap_or_default();
    if title.is_empty() {
        return invalid("title", "validation.failed", "title is required");
    }
    if title.chars().count() > MAX_TITLE {
        return invalid("title", "validation.failed", "title is too long");
    }
    let material_type = body.get("materialType").and_then(Value::as_i64).unwrap_or_default();
    if !(1..=3).contains(&material_type) {
        return invalid("materialType", "validation.failed", "materialType is unknown");
    }
    let picture = body.get("picture").and_then(Value::as_str).unwrap_or_default();
    if material_type == 1 && picture.is_empty() {
        return invalid("picture", "validation.failed", "a picture is required");
    }

    let id = match id {
        Some(id) => id,
        None => state.next_id(),
    };
    let mut record = Value::Object(body.clone());
    record["id"] = json!(id);
    record["userId"] = json!(state.user_id(email));
    record["publishDate"] = json!(CREATED_AT);
    record["updateDate"] = json!(CREATED_AT);
    state.materials.insert(id, (email.to_string(), record.clone()));
    reply(200, record)
}

fn get_material(state: &State, segment: &str) -> ResponseOutcome {
    let id = match parse_id(segment) {
        Ok(id) => id,
        Err(outcome) => return outcome,
    };
    match state.materials.get(&id) {
        Some((_, record)) => reply(200, record.clone()),
        None => reply(404, json!({"error": {"code": "learningMaterial.notFound"}})),
    }
}

fn delete_material(state: &mut State, email: &str, segment: &str) -> ResponseOutcome {
    let id = match parse_id(segment) {
        Ok(id) => id,
        Err(outcome) => return outcome,
    };
    match state.materials.get(&id) {
        None => reply(404, json!({"error": {"code": "learningMaterial.notFound"}})),
        Some((owner, _)) if owner != email => reply(403, json!({"error": {"code": "forbidden"}})),
        Some(_) => {
            state.materials.remove(&id);
            no_content()
        }
    }
}

fn education_not_found() -> ResponseOutcome {
    reply(404, json!({"error": {"code": EDUCATION_NOT_FOUND, "message": "education not found"}}))
}

/// The caller's education `segment` names, as id and record.
fn own_education<'s>(state: &'s State, email: &str, segment: &str) -> Result<(i64, &'s Value), ResponseOutcome> {
    let id = parse_id(segment)?;
    match state.educations.get(&id) {
        Some((owner, record)) if owner == email => Ok((id, record)),
        _ => Err(education_not_found()),
    }
}

fn get_education(state: &mut State, email: &str, segment: &str) -> ResponseOutcome {
    match own_education(state, email, segment) {
        Ok((_, record)) => reply(200, record.clone()),
        Err(outcome) => outcome,
    }
}

fn save_education(state: &mut State, email: &str, item: Option<&str>, body: &Map<String, Value>) -> ResponseOutcome {
    let id = match item.map(|segment| own_education(state, email, segment).map(|(id, _)| id)).transpose() {
        Ok(id) => id,
        Err(outcome) => return outcome,
    };
    let year = current_year();
    let text = |name: &str, max: usize| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty() && text.chars().count() <= max)
    };
    let Some(institution) = text("institutionName", MAX_INSTITUTION) else {
        return invalid("institutionName", "validation.failed", "institutionName is required, up to 200 characters");
    };
    let Some(field_of_study) = text("fieldOfStudy", MAX_FIELD_OF_STUDY) else {
        return invalid("fieldOfStudy", "validation.failed", "fieldOfStudy is required, up to 100 characters");
    };
    let Some(degree_id) = body.get("degreeId").and_then(Value::as_i64).filter(|id| DEGREES.contains(id)) else {
        return invalid("degreeId", "validation.failed", "degreeId is unknown");
    };
    let Some(start) = body.get("startYear").and_then(Value::as_i64).filter(|start| (1900..=year).contains(start)) else {
        return invalid("startYear", "validation.failed", "startYear is out of range");
    };
    let finish = body.get("finishYear").and_then(Value::as_i64);
    if finish.is_some_and(|finish| finish < start || finish > year) {
        return invalid("finishYear", "validation.failed", "finishYear is out of range");
    }

    let id = match id {
        Some(id) => id,
        None => state.next_id(),
    };
    let record = json!({
        "id": id,
        "teacherId": state.user_id(email),
        "institutionName": institution,
        "degreeId": degree_id,
        "fieldOfStudy": field_of_study,
        "startYear": start,
        "finishYear": finish,
        "createdAt": CREATED_AT,
        "updatedAt": CREATED_AT,
        "documents": null,
    });
    state.educations.insert(id, (email.to_string(), record.clone()));
    reply(200, record)
}

fn save_experience(state: &mut State, email: &str, body: &Map<String, Value>) -> ResponseOutcome {
    let year = current_year();
    let text = |name: &str, max: usize| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty() && text.chars().count() <= max)
    };
    let Some(organization) = text("organization", MAX_ORGANIZATION) else {
        return invalid("organization", "validation.failed", "organization is required, up to 200 characters");
    };
    let Some(position) = text("position", MAX_POSITION) else {
        return invalid("position", "validation.failed", "position is required, up to 100 characters");
    };
    let Some(start) = body.get("startYear").and_then(Value::as_i64).filter(|start| (1960..=year).contains(start)) else {
        return invalid("startYear", "validation.failed", "startYear is out of range");
    };
    let finish = body.get("finishYear").and_then(Value::as_i64);
    if finish.is_some_and(|finish| finish < start || finish > year) {
        return invalid("finishYear", "validation.failed", "finishYear is out of range");
    }
    let record = json!({
        "id": state.next_id(),
        "teacherId": state.user_id(email),
        "organization": organization,
        "position": position,
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "startYear": start,
        "finishYear": finish,
        "createdAt": CREATED_AT,
        "updatedAt": CREATED_AT,
    });
    reply(201, record)
}

/// Deposits minus purchases.
fn funds(state: &State, email: &str) -> f64 {
    let side = |entry: &Value, name: &str| entry.get(name).and_then(Value::as_f64).unwrap_or_default();
    state
        .ledger
        .get(email)
        .into_iter()
        .flatten()
        .map(|entry| side(entry, "credit") - side(entry, "debit"))
        .sum()
}

/// `("LearningMaterials", Some("5"))` for `LearningMaterials/5/`.
fn split_item(path: &str) -> (&str, Option<&str>) {
    for collection in ITEM_COLLECTIONS {
        let id = path
            .strip_prefix(collection)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| rest.trim_end_matches('/'))
            .filter(|id| !id.is_empty());
        if id.is_some() {
            return (collection, id);
        }
    }
    (path, None)
}

/// Non-numeric ids fail binding (409); numeric ones must fit a positive `i32`.
fn parse_id(segment: &str) -> Result<i64, ResponseOutcome> {
    let Ok(id) = segment.parse::<i64>() else {
        return Err(reply(
            409,
            json!({"error": {"code": "validation.failed", "message": format!("`{segment}` is not an id")}}),
        ));
    };
    if id <= 0 || id > i64::from(i32::MAX) {
        return Err(invalid("id", "id.outOfRange", "id is out of range"));
    }
    Ok(id)
}

fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.matches('@').count() != 1 {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "._+-@".contains(c);
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && email.chars().all(allowed)
        }
        None => false,
    }
}

fn refuses_accept(request: &RequestInput) -> bool {
    request.headers.get(ACCEPT).is_some_and(|accept| accept.contains("xml"))
}

fn json_body(request: &RequestInput) -> Result<&Map<String, Value>, ResponseOutcome> {
    let is_json = request
        .headers
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return Err(reply(415, json!({"error": {"code": "unsupportedMediaType"}})));
    }
    match &request.body {
        Some(Value::Object(body)) => Ok(body),
        _ => Err(reply(400, json!({"error": {"code": "badRequest", "message": "body must be an object"}}))),
    }
}

fn invalid(field: &str, code: &str, message: &str) -> ResponseOutcome {
    reply(422, json!({"error": {"code": code, "field": field, "message": message}}))
}

pub fn reply(status: u16, body: Value) -> ResponseOutcome {
    let headers = BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]);
    ResponseOutcome::new(status, headers, body.to_string())
}

fn no_content() -> ResponseOutcome {
    ResponseOutcome::new(204, BTreeMap::new(), String::new())
}

fn not_found() -> ResponseOutcome {
    reply(404, json!({"error": {"code": "routeNotFound"}}))
}

fn allow(methods: &str) -> ResponseOutcome {
    ResponseOutcome::new(204, BTreeMap::from([("Allow".to_string(), methods.to_string())]), String::new())
}
