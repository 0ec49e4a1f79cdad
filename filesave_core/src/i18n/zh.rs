pub(super) const MESSAGES: &[(u16, &str)] = &[
    (1000, "接收到无效的文件"),
    (1001, "无效的文件类型，仅允许：{{types}}"),
    (1002, "文件过大，最大允许：{{maxSize}}"),
    (1003, "未接收到文件"),
    (1004, "不允许上传多个文件"),
    (1005, "文件数量超出限制，最多允许：{{multiple}}"),
    (1006, "无效的文件大小格式：{{blobSize}}"),
    (1007, "无效的文件大小单位：{{sizeUnit}}"),
    (1008, "文件上传失败"),
];
