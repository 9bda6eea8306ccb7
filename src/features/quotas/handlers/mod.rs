pub mod quota_handler;

pub use quota_handler::{
    create_quota, delete_quota, get_quota, list_quotas, search_quotas, stat_quotas, update_quota,
};
