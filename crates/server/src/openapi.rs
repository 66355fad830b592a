use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Any subset of these keys; anything else is rejected.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProfileUpdateDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ServiceLineDoc {
    #[schema(rename = "serviceId")]
    pub service_id: String,
    pub quantity: Option<i32>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct NewBookingDoc {
    pub services: Vec<ServiceLineDoc>,
    #[schema(example = "2026-11-02")]
    pub date: String,
    #[schema(example = "10:30")]
    pub time: String,
    pub address: String,
    #[schema(rename = "totalPrice")]
    pub total_price: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pincode: Option<String>,
    /// Start the vendor search immediately.
    pub confirmation: Option<bool>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CategoryDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[schema(rename = "membershipFee")]
    pub membership_fee: Option<f64>,
    #[schema(rename = "defaultFreeCredits")]
    pub default_free_credits: Option<i32>,
    pub order: Option<i32>,
    #[schema(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SubcategoryDoc {
    #[schema(rename = "categoryId")]
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub price: Option<f64>,
    #[schema(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ServiceDoc {
    pub category: Option<Uuid>,
    pub subcategory: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    #[schema(rename = "moreInfo")]
    pub more_info: Option<String>,
    #[schema(rename = "adminPrice")]
    pub admin_price: Option<f64>,
    /// Minutes.
    #[schema(rename = "approxCompletionTime")]
    pub approx_completion_time: Option<i32>,
    #[schema(rename = "isActive")]
    pub is_active: Option<bool>,
    #[schema(rename = "quantityEnabled")]
    pub quantity_enabled: Option<bool>,
    #[schema(rename = "priceAdjustmentEnabled")]
    pub price_adjustment_enabled: Option<bool>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SectionDoc {
    pub title: Option<String>,
    #[schema(rename = "categoryId")]
    pub category_id: Option<Uuid>,
    #[schema(rename = "subcategoryId")]
    pub subcategory_id: Option<Uuid>,
    pub limit: Option<i32>,
    pub order: Option<i32>,
    #[schema(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// Multipart form; `image` is either a file part or an existing URL.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BannerFormDoc {
    pub title: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
    #[schema(rename = "categoryId")]
    pub category_id: Option<Uuid>,
    #[schema(example = "user")]
    pub audience: Option<String>,
    pub order: Option<i32>,
    #[schema(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct FeedbackDoc {
    #[schema(rename = "bookingId")]
    pub booking_id: String,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    #[schema(max_length = 1000)]
    pub review: Option<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct VendorFlagsDoc {
    #[schema(rename = "isVerified")]
    pub is_verified: Option<bool>,
    #[schema(rename = "isActive")]
    pub is_active: Option<bool>,
    #[schema(rename = "isSuspended")]
    pub is_suspended: Option<bool>,
    #[schema(rename = "isBlocked")]
    pub is_blocked: Option<bool>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::user_signup,
        crate::routes::auth::initiate_user_signup,
        crate::routes::auth::complete_user_signup,
        crate::routes::auth::vendor_signup,
        crate::routes::auth::verify_user_otp,
        crate::routes::auth::verify_vendor_otp,
        crate::routes::auth::user_login,
        crate::routes::auth::vendor_login,
        crate::routes::auth::initiate_user_login,
        crate::routes::auth::complete_user_login,
        crate::routes::auth::send_user_otp,
        crate::routes::auth::send_vendor_otp,
        crate::routes::auth::reset_user_pin,
        crate::routes::auth::reset_vendor_pin,
        crate::routes::auth::verify_reset_otp,
        crate::routes::auth::complete_reset_pin,
        crate::routes::auth::admin_login,
        crate::routes::auth::admin_signup,
        crate::routes::auth::refresh_token,
        crate::routes::auth::logout,
        crate::routes::users::get_profile,
        crate::routes::users::update_profile,
        crate::routes::users::delete_account,
        crate::routes::vendors::get_profile,
        crate::routes::vendors::toggle_duty,
        crate::routes::vendors::set_services,
        crate::routes::vendors::open_leads,
        crate::routes::vendors::later_leads,
        crate::routes::vendors::history,
        crate::routes::bookings::create,
        crate::routes::bookings::request_lead,
        crate::routes::bookings::my_bookings,
        crate::routes::bookings::completed_history,
        crate::routes::bookings::details,
        crate::routes::bookings::cancel,
        crate::routes::bookings::reschedule,
        crate::routes::bookings::retry_search,
        crate::routes::bookings::raise_dispute,
        crate::routes::bookings::accept_lead,
        crate::routes::bookings::reject_lead,
        crate::routes::bookings::mark_later,
        crate::routes::bookings::update_status,
        crate::routes::catalog::categories,
        crate::routes::catalog::subcategories,
        crate::routes::catalog::services,
        crate::routes::catalog::service_details,
        crate::routes::catalog::tree,
        crate::routes::catalog::create_category,
        crate::routes::catalog::update_category,
        crate::routes::catalog::delete_category,
        crate::routes::catalog::create_subcategory,
        crate::routes::catalog::update_subcategory,
        crate::routes::catalog::delete_subcategory,
        crate::routes::catalog::create_service,
        crate::routes::catalog::update_service,
        crate::routes::catalog::delete_service,
        crate::routes::feedback::submit,
        crate::routes::feedback::vendor_feedback,
        crate::routes::feedback::my_feedback,
        crate::routes::feedback::check,
        crate::routes::dashboard::dashboard_data,
        crate::routes::dashboard::sections,
        crate::routes::dashboard::banners,
        crate::routes::dashboard::vendor_banners,
        crate::routes::dashboard::all_sections,
        crate::routes::dashboard::create_section,
        crate::routes::dashboard::update_section,
        crate::routes::dashboard::delete_section,
        crate::routes::dashboard::seed_sections,
        crate::routes::dashboard::all_banners,
        crate::routes::dashboard::create_banner,
        crate::routes::dashboard::update_banner,
        crate::routes::dashboard::delete_banner,
        crate::routes::notifications::list,
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mute,
        crate::routes::admin::dashboard_stats,
        crate::routes::admin::list_users,
        crate::routes::admin::update_user_status,
        crate::routes::admin::user_audit_logs,
        crate::routes::admin::audit_logs_by_action,
        crate::routes::admin::set_vendor_flags,
    ),
    components(
        schemas(
            HealthResponse,
            ProfileUpdateDoc,
            ServiceLineDoc,
            NewBookingDoc,
            CategoryDoc,
            SubcategoryDoc,
            ServiceDoc,
            SectionDoc,
            BannerFormDoc,
            FeedbackDoc,
            VendorFlagsDoc,
            crate::routes::auth::UserSignupRequest,
            crate::routes::auth::VendorSignupRequest,
            crate::routes::auth::InitiateSignupRequest,
            crate::routes::auth::CompleteSignupRequest,
            crate::routes::auth::VerifyOtpRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::InitiateLoginRequest,
            crate::routes::auth::CompleteLoginRequest,
            crate::routes::auth::PhoneRequest,
            crate::routes::auth::ResetPinRequest,
            crate::routes::auth::CompleteResetRequest,
            crate::routes::auth::AdminLoginRequest,
            crate::routes::auth::AdminSignupRequest,
            crate::routes::auth::RefreshRequest,
            crate::routes::vendors::DutyRequest,
            crate::routes::vendors::ServicesRequest,
            crate::routes::bookings::CancelRequest,
            crate::routes::bookings::RescheduleRequest,
            crate::routes::bookings::DisputeRequest,
            crate::routes::bookings::StatusRequest,
            crate::routes::notifications::MuteRequest,
            crate::routes::admin::StatusUpdateRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "vendors"),
        (name = "bookings"),
        (name = "catalog"),
        (name = "feedback"),
        (name = "dashboard"),
        (name = "notifications"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
