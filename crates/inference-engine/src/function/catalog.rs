//! Function catalog
//!
//! Every function kind a compiled graph may name. Only part of the catalog
//! has kernels; see [`FunctionType::has_kernel`](super::FunctionType::has_kernel).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Family a function kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionCategory {
    /// Parameterized layers (affine, convolution, pooling)
    Layer,
    /// Activation functions
    Activation,
    /// Normalization
    Normalization,
    /// Reductions over axes
    Reduction,
    /// Arithmetic on one or two operands
    Arithmetic,
    /// Comparisons and logical operators
    Logical,
    /// Elementary math
    Math,
    /// Layout and indexing
    ArrayManipulation,
    /// Random number generation and augmentation
    Stochasticity,
    /// Loss functions
    Loss,
    /// Quantized and binarized layers
    Quantization,
    /// Validation metrics
    Validation,
    /// Graph plumbing with no inference semantics
    Special,
}

/// Kind of a function node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionType {
    /// Affine
    Affine,
    /// Convolution
    Convolution,
    /// DepthwiseConvolution
    DepthwiseConvolution,
    /// Deconvolution
    Deconvolution,
    /// MaxPooling
    MaxPooling,
    /// AveragePooling
    AveragePooling,
    /// SumPooling
    SumPooling,
    /// Unpooling
    Unpooling,
    /// Embed
    Embed,
    /// Swish
    Swish,
    /// Sigmoid
    Sigmoid,
    /// Tanh
    Tanh,
    /// ReLU
    Relu,
    /// LeakyReLU
    LeakyRelu,
    /// Softmax
    Softmax,
    /// ELU
    Elu,
    /// SELU
    Selu,
    /// CReLU
    Crelu,
    /// CELU
    Celu,
    /// PReLU
    Prelu,
    /// BatchNormalization
    BatchNormalization,
    /// MeanSubtraction
    MeanSubtraction,
    /// Sum
    Sum,
    /// Mean
    Mean,
    /// Max
    Max,
    /// Min
    Min,
    /// Prod
    Prod,
    /// ReduceSum
    ReduceSum,
    /// ReduceMean
    ReduceMean,
    /// Add2
    Add2,
    /// BcAdd2
    BcAdd2,
    /// Sub2
    Sub2,
    /// Mul2
    Mul2,
    /// Div2
    Div2,
    /// Pow2
    Pow2,
    /// AddScalar
    AddScalar,
    /// MulScalar
    MulScalar,
    /// PowScalar
    PowScalar,
    /// RSubScalar
    RSubScalar,
    /// RDivScalar
    RDivScalar,
    /// RPowScalar
    RPowScalar,
    /// Sign
    Sign,
    /// Minimum2
    Minimum2,
    /// Maximum2
    Maximum2,
    /// MinimumScalar
    MinimumScalar,
    /// MaximumScalar
    MaximumScalar,
    /// LogicalAnd
    LogicalAnd,
    /// LogicalOr
    LogicalOr,
    /// LogicalXor
    LogicalXor,
    /// Equal
    Equal,
    /// NotEqual
    NotEqual,
    /// GreaterEqual
    GreaterEqual,
    /// Greater
    Greater,
    /// LessEqual
    LessEqual,
    /// Less
    Less,
    /// LogicalAndScalar
    LogicalAndScalar,
    /// LogicalOrScalar
    LogicalOrScalar,
    /// LogicalXorScalar
    LogicalXorScalar,
    /// EqualScalar
    EqualScalar,
    /// NotEqualScalar
    NotEqualScalar,
    /// GreaterEqualScalar
    GreaterEqualScalar,
    /// GreaterScalar
    GreaterScalar,
    /// LessEqualScalar
    LessEqualScalar,
    /// LessScalar
    LessScalar,
    /// LogicalNot
    LogicalNot,
    /// Constant
    Constant,
    /// Abs
    Abs,
    /// Exp
    Exp,
    /// Log
    Log,
    /// Identity
    Identity,
    /// BatchMatmul
    BatchMatmul,
    /// Concatenate
    Concatenate,
    /// Split
    Split,
    /// Stack
    Stack,
    /// Slice
    Slice,
    /// Transpose
    Transpose,
    /// Broadcast
    Broadcast,
    /// OneHot
    OneHot,
    /// Flip
    Flip,
    /// Shift
    Shift,
    /// Reshape
    Reshape,
    /// MatrixDiag
    MatrixDiag,
    /// MatrixDiagPart
    MatrixDiagPart,
    /// Dropout
    Dropout,
    /// Rand
    Rand,
    /// Randint
    Randint,
    /// Randn
    Randn,
    /// RandomCrop
    RandomCrop,
    /// RandomFlip
    RandomFlip,
    /// RandomShift
    RandomShift,
    /// ImageAugmentation
    ImageAugmentation,
    /// SigmoidCrossEntropy
    SigmoidCrossEntropy,
    /// BinaryCrossEntropy
    BinaryCrossEntropy,
    /// SoftmaxCrossEntropy
    SoftmaxCrossEntropy,
    /// CategoricalCrossEntropy
    CategoricalCrossEntropy,
    /// SquaredError
    SquaredError,
    /// AbsoluteError
    AbsoluteError,
    /// HuberLoss
    HuberLoss,
    /// EpsilonInsensitiveLoss
    EpsilonInsensitiveLoss,
    /// KLMultinomial
    KlMultinomial,
    /// BinarySigmoid
    BinarySigmoid,
    /// BinaryTanh
    BinaryTanh,
    /// BinaryConnectAffine
    BinaryConnectAffine,
    /// BinaryConnectConvolution
    BinaryConnectConvolution,
    /// BinaryWeightAffine
    BinaryWeightAffine,
    /// BinaryWeightConvolution
    BinaryWeightConvolution,
    /// INQAffine
    InqAffine,
    /// INQConvolution
    InqConvolution,
    /// FixedPointQuantize
    FixedPointQuantize,
    /// Pow2Quantize
    Pow2Quantize,
    /// TopNError
    TopNError,
    /// BinaryError
    BinaryError,
    /// ConfusionMatrix
    ConfusionMatrix,
    /// VATNoise
    VatNoise,
    /// Unlink
    Unlink,
    /// Sink
    Sink,
}

impl FunctionType {
    /// Every catalog entry, in catalog order
    pub const ALL: [FunctionType; 116] = [
        FunctionType::Affine,
        FunctionType::Convolution,
        FunctionType::DepthwiseConvolution,
        FunctionType::Deconvolution,
        FunctionType::MaxPooling,
        FunctionType::AveragePooling,
        FunctionType::SumPooling,
        FunctionType::Unpooling,
        FunctionType::Embed,
        FunctionType::Swish,
        FunctionType::Sigmoid,
        FunctionType::Tanh,
        FunctionType::Relu,
        FunctionType::LeakyRelu,
        FunctionType::Softmax,
        FunctionType::Elu,
        FunctionType::Selu,
        FunctionType::Crelu,
        FunctionType::Celu,
        FunctionType::Prelu,
        FunctionType::BatchNormalization,
        FunctionType::MeanSubtraction,
        FunctionType::Sum,
        FunctionType::Mean,
        FunctionType::Max,
        FunctionType::Min,
        FunctionType::Prod,
        FunctionType::ReduceSum,
        FunctionType::ReduceMean,
        FunctionType::Add2,
        FunctionType::BcAdd2,
        FunctionType::Sub2,
        FunctionType::Mul2,
        FunctionType::Div2,
        FunctionType::Pow2,
        FunctionType::AddScalar,
        FunctionType::MulScalar,
        FunctionType::PowScalar,
        FunctionType::RSubScalar,
        FunctionType::RDivScalar,
        FunctionType::RPowScalar,
        FunctionType::Sign,
        FunctionType::Minimum2,
        FunctionType::Maximum2,
        FunctionType::MinimumScalar,
        FunctionType::MaximumScalar,
        FunctionType::LogicalAnd,
        FunctionType::LogicalOr,
        FunctionType::LogicalXor,
        FunctionType::Equal,
        FunctionType::NotEqual,
        FunctionType::GreaterEqual,
        FunctionType::Greater,
        FunctionType::LessEqual,
        FunctionType::Less,
        FunctionType::LogicalAndScalar,
        FunctionType::LogicalOrScalar,
        FunctionType::LogicalXorScalar,
        FunctionType::EqualScalar,
        FunctionType::NotEqualScalar,
        FunctionType::GreaterEqualScalar,
        FunctionType::GreaterScalar,
        FunctionType::LessEqualScalar,
        FunctionType::LessScalar,
        FunctionType::LogicalNot,
        FunctionType::Constant,
        FunctionType::Abs,
        FunctionType::Exp,
        FunctionType::Log,
        FunctionType::Identity,
        FunctionType::BatchMatmul,
        FunctionType::Concatenate,
        FunctionType::Split,
        FunctionType::Stack,
        FunctionType::Slice,
        FunctionType::Transpose,
        FunctionType::Broadcast,
        FunctionType::OneHot,
        FunctionType::Flip,
        FunctionType::Shift,
        FunctionType::Reshape,
        FunctionType::MatrixDiag,
        FunctionType::MatrixDiagPart,
        FunctionType::Dropout,
        FunctionType::Rand,
        FunctionType::Randint,
        FunctionType::Randn,
        FunctionType::RandomCrop,
        FunctionType::RandomFlip,
        FunctionType::RandomShift,
        FunctionType::ImageAugmentation,
        FunctionType::SigmoidCrossEntropy,
        FunctionType::BinaryCrossEntropy,
        FunctionType::SoftmaxCrossEntropy,
        FunctionType::CategoricalCrossEntropy,
        FunctionType::SquaredError,
        FunctionType::AbsoluteError,
        FunctionType::HuberLoss,
        FunctionType::EpsilonInsensitiveLoss,
        FunctionType::KlMultinomial,
        FunctionType::BinarySigmoid,
        FunctionType::BinaryTanh,
        FunctionType::BinaryConnectAffine,
        FunctionType::BinaryConnectConvolution,
        FunctionType::BinaryWeightAffine,
        FunctionType::BinaryWeightConvolution,
        FunctionType::InqAffine,
        FunctionType::InqConvolution,
        FunctionType::FixedPointQuantize,
        FunctionType::Pow2Quantize,
        FunctionType::TopNError,
        FunctionType::BinaryError,
        FunctionType::ConfusionMatrix,
        FunctionType::VatNoise,
        FunctionType::Unlink,
        FunctionType::Sink,
    ];

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            FunctionType::Affine => "Affine",
            FunctionType::Convolution => "Convolution",
            FunctionType::DepthwiseConvolution => "DepthwiseConvolution",
            FunctionType::Deconvolution => "Deconvolution",
            FunctionType::MaxPooling => "MaxPooling",
            FunctionType::AveragePooling => "AveragePooling",
            FunctionType::SumPooling => "SumPooling",
            FunctionType::Unpooling => "Unpooling",
            FunctionType::Embed => "Embed",
            FunctionType::Swish => "Swish",
            FunctionType::Sigmoid => "Sigmoid",
            FunctionType::Tanh => "Tanh",
            FunctionType::Relu => "ReLU",
            FunctionType::LeakyRelu => "LeakyReLU",
            FunctionType::Softmax => "Softmax",
            FunctionType::Elu => "ELU",
            FunctionType::Selu => "SELU",
            FunctionType::Crelu => "CReLU",
            FunctionType::Celu => "CELU",
            FunctionType::Prelu => "PReLU",
            FunctionType::BatchNormalization => "BatchNormalization",
            FunctionType::MeanSubtraction => "MeanSubtraction",
            FunctionType::Sum => "Sum",
            FunctionType::Mean => "Mean",
            FunctionType::Max => "Max",
            FunctionType::Min => "Min",
            FunctionType::Prod => "Prod",
            FunctionType::ReduceSum => "ReduceSum",
            FunctionType::ReduceMean => "ReduceMean",
            FunctionType::Add2 => "Add2",
            FunctionType::BcAdd2 => "BcAdd2",
            FunctionType::Sub2 => "Sub2",
            FunctionType::Mul2 => "Mul2",
            FunctionType::Div2 => "Div2",
            FunctionType::Pow2 => "Pow2",
            FunctionType::AddScalar => "AddScalar",
            FunctionType::MulScalar => "MulScalar",
            FunctionType::PowScalar => "PowScalar",
            FunctionType::RSubScalar => "RSubScalar",
            FunctionType::RDivScalar => "RDivScalar",
            FunctionType::RPowScalar => "RPowScalar",
            FunctionType::Sign => "Sign",
            FunctionType::Minimum2 => "Minimum2",
            FunctionType::Maximum2 => "Maximum2",
            FunctionType::MinimumScalar => "MinimumScalar",
            FunctionType::MaximumScalar => "MaximumScalar",
            FunctionType::LogicalAnd => "LogicalAnd",
            FunctionType::LogicalOr => "LogicalOr",
            FunctionType::LogicalXor => "LogicalXor",
            FunctionType::Equal => "Equal",
            FunctionType::NotEqual => "NotEqual",
            FunctionType::GreaterEqual => "GreaterEqual",
            FunctionType::Greater => "Greater",
            FunctionType::LessEqual => "LessEqual",
            FunctionType::Less => "Less",
            FunctionType::LogicalAndScalar => "LogicalAndScalar",
            FunctionType::LogicalOrScalar => "LogicalOrScalar",
            FunctionType::LogicalXorScalar => "LogicalXorScalar",
            FunctionType::EqualScalar => "EqualScalar",
            FunctionType::NotEqualScalar => "NotEqualScalar",
            FunctionType::GreaterEqualScalar => "GreaterEqualScalar",
            FunctionType::GreaterScalar => "GreaterScalar",
            FunctionType::LessEqualScalar => "LessEqualScalar",
            FunctionType::LessScalar => "LessScalar",
            FunctionType::LogicalNot => "LogicalNot",
            FunctionType::Constant => "Constant",
            FunctionType::Abs => "Abs",
            FunctionType::Exp => "Exp",
            FunctionType::Log => "Log",
            FunctionType::Identity => "Identity",
            FunctionType::BatchMatmul => "BatchMatmul",
            FunctionType::Concatenate => "Concatenate",
            FunctionType::Split => "Split",
            FunctionType::Stack => "Stack",
            FunctionType::Slice => "Slice",
            FunctionType::Transpose => "Transpose",
            FunctionType::Broadcast => "Broadcast",
            FunctionType::OneHot => "OneHot",
            FunctionType::Flip => "Flip",
            FunctionType::Shift => "Shift",
            FunctionType::Reshape => "Reshape",
            FunctionType::MatrixDiag => "MatrixDiag",
            FunctionType::MatrixDiagPart => "MatrixDiagPart",
            FunctionType::Dropout => "Dropout",
            FunctionType::Rand => "Rand",
            FunctionType::Randint => "Randint",
            FunctionType::Randn => "Randn",
            FunctionType::RandomCrop => "RandomCrop",
            FunctionType::RandomFlip => "RandomFlip",
            FunctionType::RandomShift => "RandomShift",
            FunctionType::ImageAugmentation => "ImageAugmentation",
            FunctionType::SigmoidCrossEntropy => "SigmoidCrossEntropy",
            FunctionType::BinaryCrossEntropy => "BinaryCrossEntropy",
            FunctionType::SoftmaxCrossEntropy => "SoftmaxCrossEntropy",
            FunctionType::CategoricalCrossEntropy => "CategoricalCrossEntropy",
            FunctionType::SquaredError => "SquaredError",
            FunctionType::AbsoluteError => "AbsoluteError",
            FunctionType::HuberLoss => "HuberLoss",
            FunctionType::EpsilonInsensitiveLoss => "EpsilonInsensitiveLoss",
            FunctionType::KlMultinomial => "KLMultinomial",
            FunctionType::BinarySigmoid => "BinarySigmoid",
            FunctionType::BinaryTanh => "BinaryTanh",
            FunctionType::BinaryConnectAffine => "BinaryConnectAffine",
            FunctionType::BinaryConnectConvolution => "BinaryConnectConvolution",
            FunctionType::BinaryWeightAffine => "BinaryWeightAffine",
            FunctionType::BinaryWeightConvolution => "BinaryWeightConvolution",
            FunctionType::InqAffine => "INQAffine",
            FunctionType::InqConvolution => "INQConvolution",
            FunctionType::FixedPointQuantize => "FixedPointQuantize",
            FunctionType::Pow2Quantize => "Pow2Quantize",
            FunctionType::TopNError => "TopNError",
            FunctionType::BinaryError => "BinaryError",
            FunctionType::ConfusionMatrix => "ConfusionMatrix",
            FunctionType::VatNoise => "VATNoise",
            FunctionType::Unlink => "Unlink",
            FunctionType::Sink => "Sink",
        }
    }

    /// Snake-case name used by graph descriptions
    pub fn snake_name(&self) -> &'static str {
        match self {
            FunctionType::Affine => "affine",
            FunctionType::Convolution => "convolution",
            FunctionType::DepthwiseConvolution => "depthwise_convolution",
            FunctionType::Deconvolution => "deconvolution",
            FunctionType::MaxPooling => "max_pooling",
            FunctionType::AveragePooling => "average_pooling",
            FunctionType::SumPooling => "sum_pooling",
            FunctionType::Unpooling => "unpooling",
            FunctionType::Embed => "embed",
            FunctionType::Swish => "swish",
            FunctionType::Sigmoid => "sigmoid",
            FunctionType::Tanh => "tanh",
            FunctionType::Relu => "relu",
            FunctionType::LeakyRelu => "leaky_relu",
            FunctionType::Softmax => "softmax",
            FunctionType::Elu => "elu",
            FunctionType::Selu => "selu",
            FunctionType::Crelu => "crelu",
            FunctionType::Celu => "celu",
            FunctionType::Prelu => "prelu",
            FunctionType::BatchNormalization => "batch_normalization",
            FunctionType::MeanSubtraction => "mean_subtraction",
            FunctionType::Sum => "sum",
            FunctionType::Mean => "mean",
            FunctionType::Max => "max",
            FunctionType::Min => "min",
            FunctionType::Prod => "prod",
            FunctionType::ReduceSum => "reduce_sum",
            FunctionType::ReduceMean => "reduce_mean",
            FunctionType::Add2 => "add2",
            FunctionType::BcAdd2 => "bc_add2",
            FunctionType::Sub2 => "sub2",
            FunctionType::Mul2 => "mul2",
            FunctionType::Div2 => "div2",
            FunctionType::Pow2 => "pow2",
            FunctionType::AddScalar => "add_scalar",
            FunctionType::MulScalar => "mul_scalar",
            FunctionType::PowScalar => "pow_scalar",
            FunctionType::RSubScalar => "r_sub_scalar",
            FunctionType::RDivScalar => "r_div_scalar",
            FunctionType::RPowScalar => "r_pow_scalar",
            FunctionType::Sign => "sign",
            FunctionType::Minimum2 => "minimum2",
            FunctionType::Maximum2 => "maximum2",
            FunctionType::MinimumScalar => "minimum_scalar",
            FunctionType::MaximumScalar => "maximum_scalar",
            FunctionType::LogicalAnd => "logical_and",
            FunctionType::LogicalOr => "logical_or",
            FunctionType::LogicalXor => "logical_xor",
            FunctionType::Equal => "equal",
            FunctionType::NotEqual => "not_equal",
            FunctionType::GreaterEqual => "greater_equal",
            FunctionType::Greater => "greater",
            FunctionType::LessEqual => "less_equal",
            FunctionType::Less => "less",
            FunctionType::LogicalAndScalar => "logical_and_scalar",
            FunctionType::LogicalOrScalar => "logical_or_scalar",
            FunctionType::LogicalXorScalar => "logical_xor_scalar",
            FunctionType::EqualScalar => "equal_scalar",
            FunctionType::NotEqualScalar => "not_equal_scalar",
            FunctionType::GreaterEqualScalar => "greater_equal_scalar",
            FunctionType::GreaterScalar => "greater_scalar",
            FunctionType::LessEqualScalar => "less_equal_scalar",
            FunctionType::LessScalar => "less_scalar",
            FunctionType::LogicalNot => "logical_not",
            FunctionType::Constant => "constant",
            FunctionType::Abs => "abs",
            FunctionType::Exp => "exp",
            FunctionType::Log => "log",
            FunctionType::Identity => "identity",
            FunctionType::BatchMatmul => "batch_matmul",
            FunctionType::Concatenate => "concatenate",
            FunctionType::Split => "split",
            FunctionType::Stack => "stack",
            FunctionType::Slice => "slice",
            FunctionType::Transpose => "transpose",
            FunctionType::Broadcast => "broadcast",
            FunctionType::OneHot => "one_hot",
            FunctionType::Flip => "flip",
            FunctionType::Shift => "shift",
            FunctionType::Reshape => "reshape",
            FunctionType::MatrixDiag => "matrix_diag",
            FunctionType::MatrixDiagPart => "matrix_diag_part",
            FunctionType::Dropout => "dropout",
            FunctionType::Rand => "rand",
            FunctionType::Randint => "randint",
            FunctionType::Randn => "randn",
            FunctionType::RandomCrop => "random_crop",
            FunctionType::RandomFlip => "random_flip",
            FunctionType::RandomShift => "random_shift",
            FunctionType::ImageAugmentation => "image_augmentation",
            FunctionType::SigmoidCrossEntropy => "sigmoid_cross_entropy",
            FunctionType::BinaryCrossEntropy => "binary_cross_entropy",
            FunctionType::SoftmaxCrossEntropy => "softmax_cross_entropy",
            FunctionType::CategoricalCrossEntropy => "categorical_cross_entropy",
            FunctionType::SquaredError => "squared_error",
            FunctionType::AbsoluteError => "absolute_error",
            FunctionType::HuberLoss => "huber_loss",
            FunctionType::EpsilonInsensitiveLoss => "epsilon_insensitive_loss",
            FunctionType::KlMultinomial => "kl_multinomial",
            FunctionType::BinarySigmoid => "binary_sigmoid",
            FunctionType::BinaryTanh => "binary_tanh",
            FunctionType::BinaryConnectAffine => "binary_connect_affine",
            FunctionType::BinaryConnectConvolution => "binary_connect_convolution",
            FunctionType::BinaryWeightAffine => "binary_weight_affine",
            FunctionType::BinaryWeightConvolution => "binary_weight_convolution",
            FunctionType::InqAffine => "inq_affine",
            FunctionType::InqConvolution => "inq_convolution",
            FunctionType::FixedPointQuantize => "fixed_point_quantize",
            FunctionType::Pow2Quantize => "pow2_quantize",
            FunctionType::TopNError => "top_n_error",
            FunctionType::BinaryError => "binary_error",
            FunctionType::ConfusionMatrix => "confusion_matrix",
            FunctionType::VatNoise => "vat_noise",
            FunctionType::Unlink => "unlink",
            FunctionType::Sink => "sink",
        }
    }

    /// Family of this kind
    pub fn category(&self) -> FunctionCategory {
        match self {
            FunctionType::Affine
            | FunctionType::Convolution
            | FunctionType::DepthwiseConvolution
            | FunctionType::Deconvolution
            | FunctionType::MaxPooling
            | FunctionType::AveragePooling
            | FunctionType::SumPooling
            | FunctionType::Unpooling
            | FunctionType::Embed => FunctionCategory::Layer,
            FunctionType::Swish
            | FunctionType::Sigmoid
            | FunctionType::Tanh
            | FunctionType::Relu
            | FunctionType::LeakyRelu
            | FunctionType::Softmax
            | FunctionType::Elu
            | FunctionType::Selu
            | FunctionType::Crelu
            | FunctionType::Celu
            | FunctionType::Prelu => FunctionCategory::Activation,
            FunctionType::BatchNormalization
            | FunctionType::MeanSubtraction => FunctionCategory::Normalization,
            FunctionType::Sum
            | FunctionType::Mean
            | FunctionType::Max
            | FunctionType::Min
            | FunctionType::Prod
            | FunctionType::ReduceSum
            | FunctionType::ReduceMean => FunctionCategory::Reduction,
            FunctionType::Add2
            | FunctionType::BcAdd2
            | FunctionType::Sub2
            | FunctionType::Mul2
            | FunctionType::Div2
            | FunctionType::Pow2
            | FunctionType::AddScalar
            | FunctionType::MulScalar
            | FunctionType::PowScalar
            | FunctionType::RSubScalar
            | FunctionType::RDivScalar
            | FunctionType::RPowScalar => FunctionCategory::Arithmetic,
            FunctionType::Sign
            | FunctionType::Minimum2
            | FunctionType::Maximum2
            | FunctionType::MinimumScalar
            | FunctionType::MaximumScalar
            | FunctionType::LogicalAnd
            | FunctionType::LogicalOr
            | FunctionType::LogicalXor
            | FunctionType::Equal
            | FunctionType::NotEqual
            | FunctionType::GreaterEqual
            | FunctionType::Greater
            | FunctionType::LessEqual
            | FunctionType::Less
            | FunctionType::LogicalAndScalar
            | FunctionType::LogicalOrScalar
            | FunctionType::LogicalXorScalar
            | FunctionType::EqualScalar
            | FunctionType::NotEqualScalar
            | FunctionType::GreaterEqualScalar
            | FunctionType::GreaterScalar
            | FunctionType::LessEqualScalar
            | FunctionType::LessScalar
            | FunctionType::LogicalNot => FunctionCategory::Logical,
            FunctionType::Constant
            | FunctionType::Abs
            | FunctionType::Exp
            | FunctionType::Log
            | FunctionType::Identity
            | FunctionType::BatchMatmul => FunctionCategory::Math,
            FunctionType::Concatenate
            | FunctionType::Split
            | FunctionType::Stack
            | FunctionType::Slice
            | FunctionType::Transpose
            | FunctionType::Broadcast
            | FunctionType::OneHot
            | FunctionType::Flip
            | FunctionType::Shift
            | FunctionType::Reshape
            | FunctionType::MatrixDiag
            | FunctionType::MatrixDiagPart => FunctionCategory::ArrayManipulation,
            FunctionType::Dropout
            | FunctionType::Rand
            | FunctionType::Randint
            | FunctionType::Randn
            | FunctionType::RandomCrop
            | FunctionType::RandomFlip
            | FunctionType::RandomShift
            | FunctionType::ImageAugmentation => FunctionCategory::Stochasticity,
            FunctionType::SigmoidCrossEntropy
            | FunctionType::BinaryCrossEntropy
            | FunctionType::SoftmaxCrossEntropy
            | FunctionType::CategoricalCrossEntropy
            | FunctionType::SquaredError
            | FunctionType::AbsoluteError
            | FunctionType::HuberLoss
            | FunctionType::EpsilonInsensitiveLoss
            | FunctionType::KlMultinomial => FunctionCategory::Loss,
            FunctionType::BinarySigmoid
            | FunctionType::BinaryTanh
            | FunctionType::BinaryConnectAffine
            | FunctionType::BinaryConnectConvolution
            | FunctionType::BinaryWeightAffine
            | FunctionType::BinaryWeightConvolution
            | FunctionType::InqAffine
            | FunctionType::InqConvolution
            | FunctionType::FixedPointQuantize
            | FunctionType::Pow2Quantize => FunctionCategory::Quantization,
            FunctionType::TopNError
            | FunctionType::BinaryError
            | FunctionType::ConfusionMatrix => FunctionCategory::Validation,
            FunctionType::VatNoise
            | FunctionType::Unlink
            | FunctionType::Sink => FunctionCategory::Special,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FunctionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s || t.snake_name() == s)
            .ok_or_else(|| format!("Unknown function type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = FunctionType::ALL.iter().map(|t| t.name()).collect();
        let snakes: HashSet<_> = FunctionType::ALL.iter().map(|t| t.snake_name()).collect();
        assert_eq!(names.len(), FunctionType::ALL.len());
        assert_eq!(snakes.len(), FunctionType::ALL.len());
    }

    #[test]
    fn test_parse() {
        assert_eq!("Affine".parse::<FunctionType>(), Ok(FunctionType::Affine));
        assert_eq!("leaky_relu".parse::<FunctionType>(), Ok(FunctionType::LeakyRelu));
        assert_eq!("LeakyReLU".parse::<FunctionType>(), Ok(FunctionType::LeakyRelu));
        assert!("Conv9D".parse::<FunctionType>().is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(FunctionType::Affine.category(), FunctionCategory::Layer);
        assert_eq!(FunctionType::Softmax.category(), FunctionCategory::Activation);
        assert_eq!(FunctionType::BinaryWeightAffine.category(), FunctionCategory::Quantization);
        assert_eq!(FunctionType::Sink.category(), FunctionCategory::Special);
    }
}
