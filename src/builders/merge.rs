use crate::backend::wire;
use crate::resolve::GridRegion;
use crate::tools::param_enums::MergeType;

pub fn build_merge(region: &GridRegion, merge_type: MergeType) -> wire::Request {
    wire::Request::MergeCells(wire::MergeCellsRequest {
        range: region.to_grid_range(),
        merge_type: merge_type.to_wire().to_string(),
    })
}

/// Structural inverse of merge; carries no policy parameter.
pub fn build_unmerge(region: &GridRegion) -> wire::Request {
    wire::Request::UnmergeCells(wire::UnmergeCellsRequest {
        range: region.to_grid_range(),
    })
}
