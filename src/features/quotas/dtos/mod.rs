pub mod quota_dto;

pub use quota_dto::{
    CreateQuotaDto, DomainScopeQuery, ListQuotasQuery, QuotaResponseDto, QuotaSearchParams,
    SearchQuotasDto, StatQuotasDto, UpdateQuotaDto,
};
