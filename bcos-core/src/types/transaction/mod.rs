pub mod intent;

pub mod eip1559;
pub mod legacy;

mod typed;
pub use typed::{TransactionContext, TypedTransaction};

pub(super) fn rlp_opt<T: rlp::Encodable>(rlp: &mut rlp::RlpStream, opt: &Option<T>) {
    if let Some(inner) = opt {
        rlp.append(inner);
    } else {
        rlp.append(&"");
    }
}
