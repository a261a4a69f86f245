//! Contact form: subject, e-mail, order reference, message, attachment, and
//! the store details shown alongside.

use crate::driver::{PageDriver, SelectOption, WaitState};
use crate::locator::Locator;
use crate::page_object::{first_int, Page, PageObject};
use crate::result::{StoreError, StoreResult};
use futures::future::select_ok;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Values for [`ContactUsPage::fill_contact_form`]; `None` fields are left
/// untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    /// Subject heading label
    pub subject: Option<String>,
    /// Sender e-mail
    pub email: Option<String>,
    /// Order reference
    pub order_reference: Option<String>,
    /// Message body
    pub message: Option<String>,
    /// Attachment
    pub file_path: Option<PathBuf>,
}

/// Store details shown next to the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInformation {
    /// Postal address
    pub address: Option<String>,
    /// Phone
    pub phone: Option<String>,
    /// E-mail
    pub email: Option<String>,
}

/// Client-side view of the required fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredFields {
    /// E-mail is non-blank
    pub email_filled: bool,
    /// E-mail looks like an address
    pub email_valid: bool,
    /// A real subject (not the placeholder) is selected
    pub subject_selected: bool,
    /// Message is non-blank
    pub message_filled: bool,
}

impl RequiredFields {
    /// All required fields pass
    #[must_use]
    pub const fn all_valid(&self) -> bool {
        self.email_filled && self.email_valid && self.subject_selected && self.message_filled
    }
}

/// Social networks linked from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialPlatform {
    /// Facebook
    Facebook,
    /// Twitter
    Twitter,
    /// YouTube
    Youtube,
}

impl std::str::FromStr for SocialPlatform {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "youtube" => Ok(Self::Youtube),
            _ => Err(StoreError::not_found("Social link", s)),
        }
    }
}

fn is_placeholder_subject(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Customer service page
#[derive(Debug, Clone)]
pub struct ContactUsPage<D: PageDriver> {
    page: Page<D>,
    /// Subject heading dropdown
    pub subject_select: Locator,
    /// Sender e-mail
    pub email_input: Locator,
    /// Order reference
    pub order_reference_input: Locator,
    /// Message body
    pub message_textarea: Locator,
    /// Attachment input
    pub file_upload_input: Locator,
    /// Send button
    pub send_button: Locator,
    /// Success alert
    pub success_message: Locator,
    /// Error alert
    pub error_message: Locator,
    /// Warning alert
    pub warning_message: Locator,
    /// Inline field errors
    pub required_field_errors: Locator,
    /// Heading
    pub page_title: Locator,
    /// Breadcrumb trail
    pub breadcrumb: Locator,
    /// Facebook link
    pub facebook_link: Locator,
    /// Twitter link
    pub twitter_link: Locator,
    /// YouTube link
    pub youtube_link: Locator,
    /// Store map
    pub store_map: Locator,
    /// Store address
    pub store_address: Locator,
    /// Store phone
    pub store_phone: Locator,
    /// Store e-mail
    pub store_email: Locator,
    /// Reset button
    pub reset_button: Locator,
    /// Message length counter
    pub character_counter: Locator,
}

impl<D: PageDriver> PageObject for ContactUsPage<D> {
    fn url_pattern(&self) -> &str {
        "/index.php?controller=contact"
    }

    fn page_name(&self) -> &str {
        "ContactUsPage"
    }
}

impl<D: PageDriver> ContactUsPage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            subject_select: Locator::new("#id_contact"),
            email_input: Locator::new("#email"),
            order_reference_input: Locator::new("#id_order"),
            message_textarea: Locator::new("#message"),
            file_upload_input: Locator::new("#fileUpload"),
            send_button: Locator::new("#submitMessage"),
            success_message: Locator::new(".alert-success"),
            error_message: Locator::new(".alert-danger"),
            warning_message: Locator::new(".alert-warning"),
            required_field_errors: Locator::new(".form-error"),
            page_title: Locator::new(".page-heading"),
            breadcrumb: Locator::new(".breadcrumb"),
            facebook_link: Locator::new(r#"a[href*="facebook"]"#),
            twitter_link: Locator::new(r#"a[href*="twitter"]"#),
            youtube_link: Locator::new(r#"a[href*="youtube"]"#),
            store_map: Locator::new("#map, .store-map"),
            store_address: Locator::new(".store-address"),
            store_phone: Locator::new(".store-phone"),
            store_email: Locator::new(".store-email"),
            reset_button: Locator::new(r#"button[type="reset"]"#),
            character_counter: Locator::new(".character-counter"),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Open the contact page
    pub async fn goto(&self) -> StoreResult<()> {
        self.page.goto(self.url_pattern()).await?;
        self.wait_for_page_to_load().await
    }

    /// Heading visible within 10s, then network idle
    pub async fn wait_for_page_to_load(&self) -> StoreResult<()> {
        self.page
            .wait_for(&self.page_title, WaitState::Visible, 10000)
            .await?;
        self.page.wait_for_network_idle().await
    }

    /// Choose a subject heading by label
    pub async fn select_subject(&self, subject: &str) -> StoreResult<()> {
        self.page.select_label(&self.subject_select, subject).await?;
        self.page.pause(500).await
    }

    /// Type the sender e-mail
    pub async fn fill_email(&self, email: &str) -> StoreResult<()> {
        self.page.fill(&self.email_input, email).await
    }

    /// Type the order reference
    pub async fn fill_order_reference(&self, reference: &str) -> StoreResult<()> {
        self.page.fill(&self.order_reference_input, reference).await
    }

    /// Type the message
    pub async fn fill_message(&self, message: &str) -> StoreResult<()> {
        self.page.fill(&self.message_textarea, message).await
    }

    /// Attach a file
    pub async fn upload_file(&self, path: &Path) -> StoreResult<()> {
        self.page.upload(&self.file_upload_input, path).await
    }

    /// Send
    pub async fn submit_form(&self) -> StoreResult<()> {
        self.page.click(&self.send_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Fill every field present in `form`
    pub async fn fill_contact_form(&self, form: &ContactForm) -> StoreResult<()> {
        if let Some(subject) = form.subject.as_deref() {
            self.select_subject(subject).await?;
        }
        if let Some(email) = form.email.as_deref() {
            self.fill_email(email).await?;
        }
        if let Some(reference) = form.order_reference.as_deref() {
            self.fill_order_reference(reference).await?;
        }
        if let Some(message) = form.message.as_deref() {
            self.fill_message(message).await?;
        }
        if let Some(path) = form.file_path.as_deref() {
            self.upload_file(path).await?;
        }
        Ok(())
    }

    /// Fill and send
    pub async fn submit_contact_form(&self, form: &ContactForm) -> StoreResult<()> {
        self.fill_contact_form(form).await?;
        self.submit_form().await
    }

    async fn visible_text(&self, locator: &Locator) -> StoreResult<Option<String>> {
        if self.page.is_visible(locator).await? {
            self.page.text(locator).await
        } else {
            Ok(None)
        }
    }

    /// Success alert text, if shown
    pub async fn success_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.success_message).await
    }

    /// Error alert text, if shown
    pub async fn error_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.error_message).await
    }

    /// Warning alert text, if shown
    pub async fn warning_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.warning_message).await
    }

    /// Non-blank inline field errors
    pub async fn field_errors(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .page
            .texts(&self.required_field_errors)
            .await?
            .into_iter()
            .filter(|e| !e.is_empty())
            .collect())
    }

    /// Click the reset button
    pub async fn reset_form(&self) -> StoreResult<()> {
        self.page.click(&self.reset_button).await
    }

    /// Blank the text fields and return the subject to its placeholder
    pub async fn clear_form(&self) -> StoreResult<()> {
        self.page.clear(&self.email_input).await?;
        self.page.clear(&self.order_reference_input).await?;
        self.page.clear(&self.message_textarea).await?;
        self.page
            .driver()
            .select_option(&self.subject_select, SelectOption::Index(0))
            .await
    }

    /// E-mail, message and a real subject are all present
    pub async fn is_form_valid(&self) -> StoreResult<bool> {
        let email = self.email_value().await?;
        let message = self.message_value().await?;
        let subject = self.page.value(&self.subject_select).await?;
        Ok(!email.trim().is_empty()
            && !message.trim().is_empty()
            && !is_placeholder_subject(&subject))
    }

    /// Selectable subject labels, excluding the placeholder
    pub async fn available_subjects(&self) -> StoreResult<Vec<String>> {
        let options = self.subject_select.locator("option");
        let total = self.page.count(&options).await?;
        let mut subjects = Vec::with_capacity(total);
        for i in 0..total {
            let option = options.nth(i);
            let value = self
                .page
                .attribute(&option, "value")
                .await?
                .unwrap_or_default();
            let label = self.page.text(&option).await?.unwrap_or_default();
            if !is_placeholder_subject(&value) && !label.is_empty() {
                subjects.push(label);
            }
        }
        Ok(subjects)
    }

    /// Label of the selected subject
    pub async fn current_subject(&self) -> StoreResult<Option<String>> {
        self.page
            .text(&self.subject_select.locator("option:checked"))
            .await
    }

    /// Current e-mail field value
    pub async fn email_value(&self) -> StoreResult<String> {
        self.page.value(&self.email_input).await
    }

    /// Current order reference value
    pub async fn order_reference_value(&self) -> StoreResult<String> {
        self.page.value(&self.order_reference_input).await
    }

    /// Current message value
    pub async fn message_value(&self) -> StoreResult<String> {
        self.page.value(&self.message_textarea).await
    }

    /// Number shown by the length counter, 0 without one
    pub async fn character_count(&self) -> StoreResult<u64> {
        if !self.page.is_visible(&self.character_counter).await? {
            return Ok(0);
        }
        Ok(self
            .page
            .text(&self.character_counter)
            .await?
            .as_deref()
            .and_then(first_int)
            .unwrap_or(0))
    }

    /// `maxlength` of the message field
    pub async fn max_character_limit(&self) -> StoreResult<Option<u64>> {
        Ok(self
            .page
            .attribute(&self.message_textarea, "maxlength")
            .await?
            .and_then(|v| v.trim().parse().ok()))
    }

    /// Whether the attachment input is shown
    pub async fn is_file_upload_supported(&self) -> StoreResult<bool> {
        self.page.is_visible(&self.file_upload_input).await
    }

    /// Attached file name, `None` when nothing is attached
    pub async fn uploaded_file_name(&self) -> StoreResult<Option<String>> {
        let value = self.page.value(&self.file_upload_input).await?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    /// Clear the attachment
    pub async fn remove_uploaded_file(&self) -> StoreResult<()> {
        self.page
            .upload(&self.file_upload_input, Path::new(""))
            .await
    }

    /// Store address, phone and e-mail where shown
    pub async fn contact_information(&self) -> StoreResult<ContactInformation> {
        Ok(ContactInformation {
            address: self.visible_text(&self.store_address).await?,
            phone: self.visible_text(&self.store_phone).await?,
            email: self.visible_text(&self.store_email).await?,
        })
    }

    /// Follow a social link; a hidden link is reported as not found
    pub async fn click_social_media_link(&self, platform: SocialPlatform) -> StoreResult<()> {
        let (link, name) = match platform {
            SocialPlatform::Facebook => (&self.facebook_link, "facebook"),
            SocialPlatform::Twitter => (&self.twitter_link, "twitter"),
            SocialPlatform::Youtube => (&self.youtube_link, "youtube"),
        };
        if !self.page.is_visible(link).await? {
            return Err(StoreError::not_found("Social link", name));
        }
        self.page.click(link).await
    }

    /// Whether a store map is shown
    pub async fn is_map_visible(&self) -> StoreResult<bool> {
        self.page.is_visible(&self.store_map).await
    }

    /// Heading text
    pub async fn page_title(&self) -> StoreResult<Option<String>> {
        self.page.text(&self.page_title).await
    }

    /// Non-blank breadcrumb entries
    pub async fn breadcrumb_path(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .page
            .texts(&self.breadcrumb.locator("a, span"))
            .await?
            .into_iter()
            .filter(|item| !item.is_empty())
            .collect())
    }

    /// Wait up to 10s for either the success or the error alert
    pub async fn wait_for_form_submission(&self) -> StoreResult<()> {
        let success = self
            .page
            .wait_for(&self.success_message, WaitState::Visible, 10000);
        let failure = self
            .page
            .wait_for(&self.error_message, WaitState::Visible, 10000);
        select_ok([Box::pin(success), Box::pin(failure)])
            .await
            .map(|_| ())
    }

    /// Success alert is shown
    pub async fn is_submission_successful(&self) -> StoreResult<bool> {
        self.page.is_visible(&self.success_message).await
    }

    /// Error alert or an inline field error is shown
    pub async fn has_submission_errors(&self) -> StoreResult<bool> {
        if self.page.is_visible(&self.error_message).await? {
            return Ok(true);
        }
        self.page
            .is_visible(&self.required_field_errors.first())
            .await
    }

    /// Check the required fields without submitting
    pub async fn validate_required_fields(&self) -> StoreResult<RequiredFields> {
        let email = self.email_value().await?;
        let subject = self.page.value(&self.subject_select).await?;
        let message = self.message_value().await?;
        Ok(RequiredFields {
            email_filled: !email.trim().is_empty(),
            email_valid: regex::Regex::new(EMAIL_PATTERN).is_ok_and(|re| re.is_match(&email)),
            subject_selected: !is_placeholder_subject(&subject),
            message_filled: !message.trim().is_empty(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn contact(driver: MockDriver) -> ContactUsPage<MockDriver> {
        ContactUsPage::new(Page::new(driver, "http://shop.test"))
    }

    fn form_driver() -> MockDriver {
        MockDriver::new()
            .with_elements(
                "#id_contact",
                vec![MockElement::default()
                    .with_value("0")
                    .with_options(&["-- Choose --", "Customer service", "Webmaster"])],
            )
            .with_element("#email")
            .with_element("#id_order")
            .with_element("#message")
            .with_element("#fileUpload")
            .with_element("#submitMessage")
    }

    mod parsing_tests {
        use super::*;

        #[test]
        fn test_social_platform_from_str() {
            assert_eq!(
                "Facebook".parse::<SocialPlatform>().unwrap(),
                SocialPlatform::Facebook
            );
            let err = "myspace".parse::<SocialPlatform>().unwrap_err();
            assert!(err.is_missing());
        }

        #[test]
        fn test_required_fields_all_valid() {
            let mut fields = RequiredFields {
                email_filled: true,
                email_valid: true,
                subject_selected: true,
                message_filled: true,
            };
            assert!(fields.all_valid());
            fields.email_valid = false;
            assert!(!fields.all_valid());
        }
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_contact_form_and_validate() {
            let page = contact(form_driver());
            assert!(!page.is_form_valid().await.unwrap());

            let form = ContactForm {
                subject: Some("Customer service".to_string()),
                email: Some("buyer@example.com".to_string()),
                message: Some("Where is my order?".to_string()),
                file_path: Some(PathBuf::from("/tmp/receipt.txt")),
                ..ContactForm::default()
            };
            page.fill_contact_form(&form).await.unwrap();

            assert!(page.is_form_valid().await.unwrap());
            assert!(page.validate_required_fields().await.unwrap().all_valid());
            assert_eq!(
                page.uploaded_file_name().await.unwrap().as_deref(),
                Some("receipt.txt")
            );
            assert!(!page.page().driver().was_called("fill:#id_order"));

            page.remove_uploaded_file().await.unwrap();
            assert!(page.uploaded_file_name().await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_invalid_email_flagged() {
            let page = contact(form_driver());
            page.fill_email("not-an-email").await.unwrap();
            let fields = page.validate_required_fields().await.unwrap();
            assert!(fields.email_filled);
            assert!(!fields.email_valid);
            assert!(!fields.subject_selected);
        }

        #[tokio::test]
        async fn test_clear_form_resets_subject() {
            let page = contact(form_driver());
            page.select_subject("Webmaster").await.unwrap();
            page.fill_message("hello").await.unwrap();
            page.clear_form().await.unwrap();
            assert_eq!(page.message_value().await.unwrap(), "");
            assert_eq!(
                page.page().driver().value_of("#id_contact").as_deref(),
                Some("-- Choose --")
            );
        }

        #[tokio::test]
        async fn test_available_subjects_skip_placeholder() {
            let page = contact(MockDriver::new().with_elements(
                "#id_contact >> option",
                vec![
                    MockElement::text("-- Choose --").with_attr("value", "0"),
                    MockElement::text("Customer service").with_attr("value", "2"),
                    MockElement::text(" Webmaster ").with_attr("value", "1"),
                ],
            ));
            assert_eq!(
                page.available_subjects().await.unwrap(),
                vec!["Customer service".to_string(), "Webmaster".to_string()]
            );
        }
    }

    mod message_tests {
        use super::*;

        #[tokio::test]
        async fn test_submission_outcome() {
            let page = contact(MockDriver::new().with_text(
                ".alert-danger",
                "There is 1 error: Invalid email address.",
            ));
            page.wait_for_form_submission().await.unwrap();
            assert!(!page.is_submission_successful().await.unwrap());
            assert!(page.has_submission_errors().await.unwrap());
            assert!(page.success_message().await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_submission_wait_times_out() {
            let page = contact(MockDriver::new());
            let err = page.wait_for_form_submission().await.unwrap_err();
            assert!(matches!(err, StoreError::Timeout { ms: 10000 }));
        }

        #[tokio::test]
        async fn test_character_count_and_limit() {
            let page = contact(
                MockDriver::new()
                    .with_text(".character-counter", "42 / 500 characters")
                    .with_elements("#message", vec![MockElement::default().with_attr("maxlength", "500")]),
            );
            assert_eq!(page.character_count().await.unwrap(), 42);
            assert_eq!(page.max_character_limit().await.unwrap(), Some(500));
        }

        #[tokio::test]
        async fn test_hidden_social_link_not_found() {
            let page = contact(
                MockDriver::new()
                    .with_elements(r#"a[href*="twitter"]"#, vec![MockElement::hidden()]),
            );
            let err = page
                .click_social_media_link(SocialPlatform::Twitter)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Social link twitter not found");
        }

        #[tokio::test]
        async fn test_breadcrumb_and_contact_info() {
            let page = contact(
                MockDriver::new()
                    .with_elements(
                        ".breadcrumb >> a, span",
                        vec![
                            MockElement::text("Home"),
                            MockElement::text(" "),
                            MockElement::text("Contact"),
                        ],
                    )
                    .with_text(".store-phone", "0123-456-789"),
            );
            assert_eq!(page.breadcrumb_path().await.unwrap(), vec!["Home", "Contact"]);
            let info = page.contact_information().await.unwrap();
            assert_eq!(info.phone.as_deref(), Some("0123-456-789"));
            assert!(info.address.is_none());
        }
    }
}
