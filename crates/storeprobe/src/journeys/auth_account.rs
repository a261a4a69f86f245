//! Registration, sign-in and account page journeys.

use super::Journey;
use crate::driver::{PageDriver, WaitState};
use crate::fixtures::{unique_email, TestData, UserData};
use crate::locator::Locator;
use crate::pages::Storefront;
use crate::result::StoreResult;
use crate::scenario::{Scenario, ScenarioReport};

/// Passwords the registration form should reject
pub const WEAK_PASSWORDS: [&str; 4] = ["123", "abc", "password", "12345678"];

/// Wordings of the duplicate e-mail error; any one of them is enough
pub const DUPLICATE_EMAIL_ERRORS: [&str; 4] = [
    "already registered",
    "been registered",
    "already exists",
    "already used",
];

/// Link texts expected on the account page; at least one must be shown
pub const ACCOUNT_LINKS: [&str; 5] = [
    "order history",
    "personal information",
    "addresses",
    "my credit slips",
    "my addresses",
];

/// Address assumed to be registered already
const EXISTING_EMAIL: &str = "test@example.com";

async fn open_sign_in<D: PageDriver>(store: &Storefront<D>) -> StoreResult<()> {
    store.home.goto().await?;
    store.home.click_sign_in().await?;
    store.login.wait_for_page_to_load().await
}

/// Register a fresh customer, sign out and sign back in
pub async fn registration_and_login<D: PageDriver>(
    store: &Storefront<D>,
    data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::RegistrationAndLogin.name());
    let login = &store.login;
    let user = UserData {
        gender: "Mr".to_string(),
        dob_day: Some("15".to_string()),
        dob_month: Some("6".to_string()),
        dob_year: Some("1990".to_string()),
        company: Some("Storeprobe Testing".to_string()),
        mobile_phone: data.valid_user.phone.clone(),
        address_alias: Some("My Address".to_string()),
        ..data.valid_user.with_unique_email()
    };

    scenario
        .step("Navigate to login page", open_sign_in(store))
        .await;

    scenario
        .step("Create new account", async {
            login.create_account(&user.email).await?;
            store
                .page()
                .wait_for(&login.first_name_input, WaitState::Visible, 10_000)
                .await
        })
        .await;

    scenario
        .step("Fill registration form", login.fill_registration_form(&user))
        .await;

    scenario
        .step("Submit registration", async {
            login.submit_registration().await?;
            store.page().wait_for_network_idle().await
        })
        .await;

    scenario
        .step("Verify successful registration and login", async {
            let mut soft = scenario.soft();
            if login.is_logged_in().await? {
                soft.assert_true(login.is_on_my_account_page().await?, "on my account page");
            } else {
                login.login(&user.email, &user.password).await?;
                soft.assert_true(login.is_logged_in().await?, "logged in after sign-in");
            }
            Ok(soft)
        })
        .await;

    scenario
        .step("Logout", async {
            login.logout().await?;
            let mut soft = scenario.soft();
            soft.assert_false(login.is_logged_in().await?, "still logged in");
            Ok(soft)
        })
        .await;

    scenario
        .step("Login with created credentials", async {
            login.login(&user.email, &user.password).await?;
            let mut soft = scenario.soft();
            soft.assert_true(login.is_logged_in().await?, "logged in");
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Rejected sign-in with wrong, empty and malformed credentials
pub async fn invalid_login<D: PageDriver>(store: &Storefront<D>, data: &TestData) -> ScenarioReport {
    let scenario = Scenario::new(Journey::InvalidLogin.name());
    let login = &store.login;

    scenario
        .step("Navigate to login page", open_sign_in(store))
        .await;

    scenario
        .step(
            "Attempt login with invalid credentials",
            login.login(&data.invalid_user.email, &data.invalid_user.password),
        )
        .await;

    scenario
        .step("Verify login error message is displayed", async {
            let mut soft = scenario.soft();
            let error = login.login_error_message().await?;
            soft.assert_some(&error, "login error");
            if let Some(error) = &error {
                soft.assert_contains_any(
                    error,
                    &["Authentication failed", "Invalid email", "password"],
                    "login error",
                );
            }
            let still_there = store.page().is_visible(&login.login_email_input).await?;
            soft.assert_true(still_there, "still on login page");
            Ok(soft)
        })
        .await;

    for (step, email, password) in [
        ("Test empty credentials", "", ""),
        ("Test invalid email format", "invalid-email", "password123"),
    ] {
        scenario
            .step(step, async {
                login.login(email, password).await?;
                let mut soft = scenario.soft();
                soft.assert_some(&login.login_error_message().await?, "login error");
                Ok(soft)
            })
            .await;
    }

    scenario.finish()
}

/// Register, check the account page and its links, then sign out
pub async fn my_account<D: PageDriver>(store: &Storefront<D>, data: &TestData) -> ScenarioReport {
    let scenario = Scenario::new(Journey::MyAccount.name());
    let login = &store.login;
    let page = store.page();
    let user = UserData {
        gender: "Mrs".to_string(),
        address_alias: Some("Home".to_string()),
        ..data.valid_user.with_unique_email()
    };

    scenario
        .step("Create and login with test user", async {
            open_sign_in(store).await?;
            login.complete_registration(&user.email, &user).await
        })
        .await;

    scenario
        .step("Verify My Account page elements", async {
            let mut soft = scenario.soft();
            soft.assert_true(login.is_on_my_account_page().await?, "on my account page");
            soft.assert_true(page.is_visible(&login.account_info).await?, "account info visible");
            soft.assert_true(login.is_logged_in().await?, "logged in");
            Ok(soft)
        })
        .await;

    scenario
        .step("Verify account page navigation links", async {
            let mut found = 0usize;
            for text in ACCOUNT_LINKS {
                let link = Locator::new(&format!("a:has-text({text:?})")).first();
                if page.is_visible_within(&link, 2000).await? {
                    found += 1;
                }
            }
            tracing::debug!(found, "account links");
            let mut soft = scenario.soft();
            soft.assert_gt(&found, &0, "account links found");
            Ok(soft)
        })
        .await;

    scenario
        .step("Test logout functionality from account page", async {
            login.logout().await?;
            let mut soft = scenario.soft();
            soft.assert_false(login.is_logged_in().await?, "still logged in");
            soft.assert_false(login.is_on_my_account_page().await?, "still on account page");
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Submit the registration form with weak passwords until one is rejected
/// for its password
pub async fn password_validation<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::PasswordValidation.name());
    let login = &store.login;
    let page = store.page();

    scenario
        .step("Navigate to registration page", async {
            open_sign_in(store).await?;
            login.create_account(&unique_email()).await
        })
        .await;

    scenario
        .step("Test weak password validation", async {
            let mut soft = scenario.soft();
            for password in WEAK_PASSWORDS {
                page.check(&login.title_mr).await?;
                page.fill(&login.first_name_input, "Test").await?;
                page.fill(&login.last_name_input, "User").await?;
                page.fill(&login.password_input, password).await?;
                page.fill(&login.address_first_name_input, "Test").await?;
                page.fill(&login.address_last_name_input, "User").await?;
                page.fill(&login.address_input, "123 Test St").await?;
                page.fill(&login.city_input, "Test City").await?;
                page.fill(&login.postal_code_input, "12345").await?;

                let rejection = async {
                    login.submit_registration().await?;
                    if page.is_visible_within(&login.error_message, 3000).await? {
                        page.text(&login.error_message).await
                    } else {
                        Ok(None)
                    }
                };
                match rejection.await {
                    Ok(Some(message)) if message.to_lowercase().contains("password") => {
                        tracing::info!(password, %message, "weak password rejected");
                        soft.assert_contains_ignore_case(&message, "password", "password error");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(password, error = %e, "submission failed"),
                }
            }
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Start registration with an address that already has an account
pub async fn existing_email<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::ExistingEmail.name());
    let login = &store.login;

    scenario
        .step("Navigate to login page", open_sign_in(store))
        .await;

    scenario
        .step(
            "Try to create account with existing email",
            login.create_account(EXISTING_EMAIL),
        )
        .await;

    scenario
        .step("Verify error message for existing email", async {
            let mut soft = scenario.soft();
            if let Some(error) = login.create_account_error_message().await? {
                soft.assert_contains_any(
                    &error,
                    &DUPLICATE_EMAIL_ERRORS,
                    "existing account error",
                );
            } else if store
                .page()
                .is_visible_within(&login.login_password_input, 3000)
                .await?
            {
                tracing::info!("existing address redirected to sign-in");
            }
            Ok(soft)
        })
        .await;

    scenario.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use crate::page_object::Page;
    use crate::scenario::StepStatus;

    fn store(driver: MockDriver) -> Storefront<MockDriver> {
        Storefront::new(&Page::new(driver, "http://shop.test"))
    }

    fn sign_in_page() -> MockDriver {
        MockDriver::new()
            .with_element(".login")
            .with_element("#email_create")
            .with_element("#SubmitCreate")
            .with_element("#email")
            .with_element("#passwd")
            .with_element("#SubmitLogin")
    }

    #[tokio::test]
    async fn test_invalid_login_passes_with_error_shown() {
        let error = MockElement {
            visible: false,
            ..MockElement::text("There is 1 error: Authentication failed.")
        };
        let driver = sign_in_page()
            .with_elements(".alert-danger", vec![error])
            .on_click("#SubmitLogin", MockEffect::Show(".alert-danger".to_string()));
        let store = store(driver);

        let report = invalid_login(&store, &TestData::default()).await;
        assert_eq!(report.steps.len(), 5);
        assert!(report.is_success(), "{report:?}");
        assert!(store
            .page()
            .driver()
            .was_called("fill:#email:invalid@example.com"));
    }

    #[tokio::test]
    async fn test_invalid_login_fails_without_error() {
        let report = invalid_login(&store(sign_in_page()), &TestData::default()).await;
        let failed: Vec<&str> = report
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            failed,
            vec![
                "Verify login error message is displayed",
                "Test empty credentials",
                "Test invalid email format",
            ]
        );
    }

    #[tokio::test]
    async fn test_existing_email_accepts_any_wording() {
        let driver = sign_in_page().with_text(
            ".alert-danger, #create_account_error",
            "An account using this email address is already registered.",
        );
        let report = existing_email(&store(driver), &TestData::default()).await;
        assert!(report.is_success());
        assert_eq!(report.skipped(), 0);
    }

    #[tokio::test]
    async fn test_existing_email_storefront_wording() {
        let driver = sign_in_page().with_text(
            ".alert-danger, #create_account_error",
            "An account using this email address has already been registered. Please enter a valid password or request a new one.",
        );
        let report = existing_email(&store(driver), &TestData::default()).await;
        assert!(report.is_success());
        assert_eq!(report.failed(), 0);
    }

    #[tokio::test]
    async fn test_existing_email_wrong_message_fails() {
        let driver = sign_in_page().with_text(".alert-danger, #create_account_error", "Invalid email address.");
        let report = existing_email(&store(driver), &TestData::default()).await;
        assert_eq!(report.failed(), 1);
        assert!(report.steps[2].messages[0].contains("already registered"));
    }

    #[tokio::test]
    async fn test_password_validation_stops_at_first_rejection() {
        let mut driver = sign_in_page();
        for field in [
            "#id_gender1",
            "#customer_firstname",
            "#customer_lastname",
            "#firstname",
            "#lastname",
            "#address1",
            "#city",
            "#postcode",
            "#submitAccount",
        ] {
            driver = driver.with_element(field);
        }
        let driver = driver.with_text(".alert-danger", "passwd is invalid. Password too short");
        let store = store(driver);
        let report = password_validation(&store, &TestData::default()).await;
        assert!(report.is_success(), "{report:?}");
        let history = store.page().driver().history();
        let submits = history.iter().filter(|c| c.starts_with("click:#submitAccount")).count();
        assert_eq!(submits, 1);
    }

    #[tokio::test]
    async fn test_account_links_need_one_match() {
        let driver = MockDriver::new()
            .with_text(".page-heading", "My account")
            .with_element(".info-account")
            .with_element(".logout")
            .with_element(r#"a:has-text("addresses")"#);
        let report = my_account(&store(driver), &TestData::default()).await;
        // Registration cannot run on this page; the checks that follow can.
        assert_eq!(report.steps[0].status, StepStatus::Skipped);
        assert_eq!(report.steps[1].status, StepStatus::Passed);
        assert_eq!(report.steps[2].status, StepStatus::Passed);
    }
}
