/// 存储权限查询结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// 存储权限端口。申请权限的界面由宿主负责，这里只关心结果。
pub trait PermissionGate: Send + Sync {
    fn ensure_storage_access(&self) -> PermissionStatus;
}

/// 桌面与命令行环境没有权限模型，总是放行。
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeGranted;

impl PermissionGate for AssumeGranted {
    fn ensure_storage_access(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}
