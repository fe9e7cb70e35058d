//! Chapter engine: network fetch, decoding, site adapters and the archive.
mod archive;
mod cookies;
mod decode;
mod fetch;
mod run;
mod site;

pub use archive::{ensure_output_dir, load_completed_titles, ArchiveError, ChapterArchive};
pub use cookies::{load_cookie_header, CookieError};
pub use decode::decode_page;
pub use fetch::{FetchError, FetchSettings, IdentityProfile, Page, PageFetcher, ReqwestFetcher};
pub use run::{run, RunError, RunSettings, RunSummary};
pub use site::{GenericSite, SiteAdapter};
