//! Authentication page: sign-in, account creation, registration form and
//! the "My account" landing.

use crate::driver::{PageDriver, WaitState};
use crate::fixtures::UserData;
use crate::locator::Locator;
use crate::page_object::{Page, PageObject};
use crate::result::StoreResult;

/// Sign-in and registration page
#[derive(Debug, Clone)]
pub struct LoginPage<D: PageDriver> {
    page: Page<D>,
    /// Sign-in e-mail
    pub login_email_input: Locator,
    /// Sign-in password
    pub login_password_input: Locator,
    /// Sign-in submit
    pub login_submit_button: Locator,
    /// Sign-in error alert
    pub login_error: Locator,
    /// "Create an account" e-mail
    pub create_account_email_input: Locator,
    /// "Create an account" submit
    pub create_account_button: Locator,
    /// "Create an account" error alert
    pub create_account_error: Locator,
    /// Title: Mr
    pub title_mr: Locator,
    /// Title: Mrs
    pub title_mrs: Locator,
    /// Customer first name
    pub first_name_input: Locator,
    /// Customer last name
    pub last_name_input: Locator,
    /// Registration password
    pub password_input: Locator,
    /// Birth day
    pub dob_day_select: Locator,
    /// Birth month
    pub dob_month_select: Locator,
    /// Birth year
    pub dob_year_select: Locator,
    /// Newsletter opt-in
    pub newsletter_checkbox: Locator,
    /// Partner offers opt-in
    pub offers_checkbox: Locator,
    /// Address first name
    pub address_first_name_input: Locator,
    /// Address last name
    pub address_last_name_input: Locator,
    /// Company
    pub company_input: Locator,
    /// Street address
    pub address_input: Locator,
    /// Second address line
    pub address2_input: Locator,
    /// City
    pub city_input: Locator,
    /// State dropdown
    pub state_select: Locator,
    /// Postcode
    pub postal_code_input: Locator,
    /// Country dropdown
    pub country_select: Locator,
    /// Additional information
    pub additional_info_input: Locator,
    /// Home phone
    pub home_phone_input: Locator,
    /// Mobile phone
    pub mobile_phone_input: Locator,
    /// Address alias
    pub address_alias_input: Locator,
    /// Registration submit
    pub register_button: Locator,
    /// Success alert
    pub success_message: Locator,
    /// Error alert
    pub error_message: Locator,
    /// Page heading
    pub my_account_title: Locator,
    /// Account welcome text
    pub account_info: Locator,
    /// Sign-out link
    pub logout_link: Locator,
}

impl<D: PageDriver> PageObject for LoginPage<D> {
    fn url_pattern(&self) -> &str {
        "/index.php?controller=authentication&back=my-account"
    }

    fn page_name(&self) -> &str {
        "LoginPage"
    }
}

impl<D: PageDriver> LoginPage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            login_email_input: Locator::new("#email"),
            login_password_input: Locator::new("#passwd"),
            login_submit_button: Locator::new("#SubmitLogin"),
            login_error: Locator::new(".alert-danger"),
            create_account_email_input: Locator::new("#email_create"),
            create_account_button: Locator::new("#SubmitCreate"),
            create_account_error: Locator::new(".alert-danger, #create_account_error"),
            title_mr: Locator::new("#id_gender1"),
            title_mrs: Locator::new("#id_gender2"),
            first_name_input: Locator::new("#customer_firstname"),
            last_name_input: Locator::new("#customer_lastname"),
            password_input: Locator::new("#passwd"),
            dob_day_select: Locator::new("#days"),
            dob_month_select: Locator::new("#months"),
            dob_year_select: Locator::new("#years"),
            newsletter_checkbox: Locator::new("#newsletter"),
            offers_checkbox: Locator::new("#optin"),
            address_first_name_input: Locator::new("#firstname"),
            address_last_name_input: Locator::new("#lastname"),
            company_input: Locator::new("#company"),
            address_input: Locator::new("#address1"),
            address2_input: Locator::new("#address2"),
            city_input: Locator::new("#city"),
            state_select: Locator::new("#id_state"),
            postal_code_input: Locator::new("#postcode"),
            country_select: Locator::new("#id_country"),
            additional_info_input: Locator::new("#other"),
            home_phone_input: Locator::new("#phone"),
            mobile_phone_input: Locator::new("#phone_mobile"),
            address_alias_input: Locator::new("#alias"),
            register_button: Locator::new("#submitAccount"),
            success_message: Locator::new(".alert-success"),
            error_message: Locator::new(".alert-danger"),
            my_account_title: Locator::new(".page-heading"),
            account_info: Locator::new(".info-account"),
            logout_link: Locator::new(".logout"),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Open the authentication page directly
    pub async fn goto(&self) -> StoreResult<()> {
        self.page.goto(self.url_pattern()).await?;
        self.wait_for_page_to_load().await
    }

    /// Wait until either sign-in form is rendered
    pub async fn wait_for_page_to_load(&self) -> StoreResult<()> {
        self.page
            .wait_for(&self.create_account_email_input, WaitState::Visible, 10000)
            .await?;
        self.page.wait_for_network_idle().await
    }

    /// Sign in
    pub async fn login(&self, email: &str, password: &str) -> StoreResult<()> {
        self.page.fill(&self.login_email_input, email).await?;
        self.page.fill(&self.login_password_input, password).await?;
        self.page.click(&self.login_submit_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Start account creation for `email`
    pub async fn create_account(&self, email: &str) -> StoreResult<()> {
        self.page
            .fill(&self.create_account_email_input, email)
            .await?;
        self.page.click(&self.create_account_button).await?;
        self.page.wait_for_network_idle().await
    }

    async fn fill_optional(&self, locator: &Locator, value: Option<&str>) -> StoreResult<()> {
        match value {
            Some(v) if !v.is_empty() => self.page.fill(locator, v).await,
            _ => Ok(()),
        }
    }

    async fn select_optional_value(&self, locator: &Locator, value: Option<&str>) -> StoreResult<()> {
        match value {
            Some(v) if !v.is_empty() => self.page.select_value(locator, v).await,
            _ => Ok(()),
        }
    }

    async fn select_optional_label(&self, locator: &Locator, label: Option<&str>) -> StoreResult<()> {
        match label {
            Some(l) if !l.is_empty() => self.page.select_label(locator, l).await,
            _ => Ok(()),
        }
    }

    /// Fill the registration form. Optional fields are skipped when unset.
    pub async fn fill_registration_form(&self, user: &UserData) -> StoreResult<()> {
        let title = if user.gender == "Mr" {
            &self.title_mr
        } else {
            &self.title_mrs
        };
        self.page.check(title).await?;

        self.page
            .fill(&self.first_name_input, &user.first_name)
            .await?;
        self.page.fill(&self.last_name_input, &user.last_name).await?;
        self.page.fill(&self.password_input, &user.password).await?;

        self.select_optional_value(&self.dob_day_select, user.dob_day.as_deref())
            .await?;
        self.select_optional_value(&self.dob_month_select, user.dob_month.as_deref())
            .await?;
        self.select_optional_value(&self.dob_year_select, user.dob_year.as_deref())
            .await?;

        self.page
            .fill(&self.address_first_name_input, &user.first_name)
            .await?;
        self.page
            .fill(&self.address_last_name_input, &user.last_name)
            .await?;
        self.fill_optional(&self.company_input, user.company.as_deref())
            .await?;
        self.page.fill(&self.address_input, &user.address).await?;
        self.fill_optional(&self.address2_input, user.address2.as_deref())
            .await?;
        self.page.fill(&self.city_input, &user.city).await?;
        self.select_optional_label(&self.state_select, user.state.as_deref())
            .await?;
        self.page
            .fill(&self.postal_code_input, &user.zip_code)
            .await?;
        self.select_optional_label(&self.country_select, user.country.as_deref())
            .await?;
        self.fill_optional(&self.additional_info_input, user.additional_info.as_deref())
            .await?;
        self.fill_optional(&self.home_phone_input, user.phone.as_deref())
            .await?;
        self.fill_optional(&self.mobile_phone_input, user.mobile_phone.as_deref())
            .await?;
        self.fill_optional(&self.address_alias_input, user.address_alias.as_deref())
            .await
    }

    /// Submit the registration form
    pub async fn submit_registration(&self) -> StoreResult<()> {
        self.page.click(&self.register_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Create the account, fill the form and submit it
    pub async fn complete_registration(&self, email: &str, user: &UserData) -> StoreResult<()> {
        self.create_account(email).await?;
        self.page
            .wait_for(&self.first_name_input, WaitState::Visible, 10000)
            .await?;
        self.fill_registration_form(user).await?;
        self.submit_registration().await
    }

    /// Sign out
    pub async fn logout(&self) -> StoreResult<()> {
        self.page.click(&self.logout_link).await?;
        self.page.wait_for_network_idle().await
    }

    async fn visible_text(&self, locator: &Locator) -> StoreResult<Option<String>> {
        if self.page.is_visible(locator).await? {
            self.page.text(locator).await
        } else {
            Ok(None)
        }
    }

    /// Sign-in error, if shown
    pub async fn login_error_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.login_error).await
    }

    /// Account creation error, if shown
    pub async fn create_account_error_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.create_account_error).await
    }

    /// Whether the sign-out link is shown
    pub async fn is_logged_in(&self) -> StoreResult<bool> {
        self.page.is_visible(&self.logout_link).await
    }

    /// Whether the heading reads "My account"
    pub async fn is_on_my_account_page(&self) -> StoreResult<bool> {
        if !self.page.is_visible(&self.my_account_title).await? {
            return Ok(false);
        }
        Ok(self
            .page
            .text(&self.my_account_title)
            .await?
            .is_some_and(|t| t.to_lowercase().contains("my account")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect, MockElement};

    fn login(driver: MockDriver) -> LoginPage<MockDriver> {
        LoginPage::new(Page::new(driver, "http://shop.test"))
    }

    fn registration_form() -> MockDriver {
        let mut driver = MockDriver::new();
        for field in [
            "#customer_firstname",
            "#customer_lastname",
            "#passwd",
            "#firstname",
            "#lastname",
            "#company",
            "#address1",
            "#city",
            "#postcode",
            "#phone",
            "#phone_mobile",
            "#alias",
            "#id_gender1",
            "#id_gender2",
        ] {
            driver = driver.with_element(field);
        }
        driver
            .with_elements("#days", vec![MockElement::default()])
            .with_elements(
                "#id_state",
                vec![MockElement::default().with_options(&["-", "Alabama"])],
            )
            .with_elements(
                "#id_country",
                vec![MockElement::default().with_options(&["-", "United States"])],
            )
    }

    #[tokio::test]
    async fn test_login_fills_and_submits() {
        let page = login(
            MockDriver::new()
                .with_element("#email")
                .with_element("#passwd")
                .with_element("#SubmitLogin")
                .on_click("#SubmitLogin", MockEffect::Show(".logout".to_string())),
        );
        page.login("a@b.c", "secret").await.unwrap();
        assert_eq!(page.page().driver().value_of("#passwd").as_deref(), Some("secret"));
        assert!(page.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_fill_registration_skips_unset_optionals() {
        let page = login(registration_form());
        let user = UserData {
            gender: "Mrs".to_string(),
            dob_day: Some("15".to_string()),
            company: Some("Acme".to_string()),
            ..UserData::default()
        };
        page.fill_registration_form(&user).await.unwrap();

        let driver = page.page().driver();
        assert!(driver.was_called("set_checked:#id_gender2:true"));
        assert_eq!(driver.value_of("#days").as_deref(), Some("15"));
        assert_eq!(driver.value_of("#company").as_deref(), Some("Acme"));
        assert_eq!(driver.value_of("#id_state").as_deref(), Some("Alabama"));
        assert!(!driver.was_called("fill:#address2"));
        assert!(!driver.was_called("select_option:#months"));
    }

    #[tokio::test]
    async fn test_error_message_only_when_visible() {
        let hidden = login(MockDriver::new().with_elements(".alert-danger", vec![MockElement::hidden()]));
        assert!(hidden.login_error_message().await.unwrap().is_none());

        let shown = login(MockDriver::new().with_text(".alert-danger", " Authentication failed. "));
        assert_eq!(
            shown.login_error_message().await.unwrap().as_deref(),
            Some("Authentication failed.")
        );
    }

    #[tokio::test]
    async fn test_my_account_heading() {
        let page = login(MockDriver::new().with_text(".page-heading", "My account"));
        assert!(page.is_on_my_account_page().await.unwrap());
        let other = login(MockDriver::new().with_text(".page-heading", "Authentication"));
        assert!(!other.is_on_my_account_page().await.unwrap());
    }
}
