mod address;
mod data_coding;
mod first_octet;
mod mt_pdu;
mod numbering_plan;
mod timestamp;
mod type_of_number;
mod user_data;

pub use address::{Address, LengthUnit};
pub use data_coding::DataCoding;
pub use first_octet::DeliverFirstOctet;
pub use mt_pdu::{DecoderConfig, MtPdu, MtPduDecoder, tpdu_length};
pub use numbering_plan::NumberingPlan;
pub use timestamp::Timestamp;
pub use type_of_number::TypeOfNumber;
pub use user_data::{
    ConcatenationHeader, IEI_CONCAT_16BIT, IEI_CONCAT_8BIT, InformationElement, UserData,
    UserDataHeader,
};
