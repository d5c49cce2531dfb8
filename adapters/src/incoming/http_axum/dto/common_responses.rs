#[cfg(feature = "docs")]
use utoipa::ToResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Bad Request"))]
pub struct BadRequestResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Validation Error"))]
pub struct ValidationErrorResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Job or file not found"))]
pub struct NotFoundResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Internal Server Error"))]
pub struct InternalServerErrorResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(
    description = "Rendered poster file (image/png or image/svg+xml)",
    content_type = "application/octet-stream",
    headers(
        ("Content-Disposition" = String, description = "attachment or inline, with the suggested file name"),
        ("Cache-Control" = String, description = "no-transform")
    )
))]
pub struct PosterFileBodyResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(
    description = "ZIP archive of every rendered theme",
    content_type = "application/zip",
    headers(
        ("Content-Disposition" = String, description = "attachment; filename=\"poster_{location}_all_themes.zip\""),
        ("Cache-Control" = String, description = "no-transform")
    )
))]
pub struct PosterArchiveBodyResponse;
