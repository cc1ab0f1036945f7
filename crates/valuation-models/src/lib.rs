pub mod dcf;
pub mod eva;
pub mod graham;
pub mod inputs;
pub mod lynch;
pub mod ncav;
pub mod price_to_cash_flow;
pub mod price_to_sales;
pub mod rim;

#[cfg(test)]
mod test_support;

pub use dcf::DcfModel;
pub use eva::EvaModel;
pub use graham::GrahamModel;
pub use lynch::LynchModel;
pub use ncav::NcavModel;
pub use price_to_cash_flow::PriceToCashFlowModel;
pub use price_to_sales::PriceToSalesModel;
pub use rim::RimModel;

use valuation_core::ValuationModel;

/// All eight independent valuation models, in `ModelId::ALL` order.
pub fn all_models() -> Vec<Box<dyn ValuationModel>> {
    vec![
        Box::new(DcfModel),
        Box::new(RimModel),
        Box::new(EvaModel),
        Box::new(GrahamModel),
        Box::new(LynchModel),
        Box::new(NcavModel),
        Box::new(PriceToSalesModel),
        Box::new(PriceToCashFlowModel),
    ]
}
